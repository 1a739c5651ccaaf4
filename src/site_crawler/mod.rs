pub mod contact_extractor;
pub mod crawler;
pub mod fetcher;
pub mod links;
pub mod signatures;
pub mod types;

// Re-export the main types for easy importing
pub use crawler::SiteCrawler;
pub use types::{CrawlLimits, CrawlReport, SiteFindings}; // PageContent, LinkBuckets
