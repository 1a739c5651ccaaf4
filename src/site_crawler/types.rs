// src/site_crawler/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Budget and timing knobs for a single site crawl.
#[derive(Debug, Clone)]
pub struct CrawlLimits {
    /// Number of successfully fetched pages before the crawl stops.
    pub max_pages: usize,
    pub timeout_seconds: u64,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: 10,
            timeout_seconds: 10,
        }
    }
}

/// Two views of one fetched page: visible text for email scanning,
/// serialized markup for vendor signature scanning.
#[derive(Debug)]
pub struct PageContent {
    pub text: String,
    pub markup: String,
}

/// Everything the crawl learned about one website.
///
/// `pos_system` and `reservation_platform` are set-once: the first page
/// that triggers a detection wins and later pages never overwrite it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFindings {
    pub emails: HashSet<String>,
    pub pos_system: Option<String>,
    pub loyalty_programs: HashSet<String>,
    pub reservation_platform: Option<String>,
}

impl SiteFindings {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.pos_system.is_none()
            && self.loyalty_programs.is_empty()
            && self.reservation_platform.is_none()
    }

    /// Loyalty programs joined with "; " for display and export.
    pub fn loyalty_joined(&self) -> String {
        let mut programs: Vec<&str> = self.loyalty_programs.iter().map(String::as_str).collect();
        programs.sort_unstable();
        programs.join("; ")
    }

    /// Emails sorted for stable display and export.
    pub fn sorted_emails(&self) -> Vec<String> {
        let mut emails: Vec<String> = self.emails.iter().cloned().collect();
        emails.sort_unstable();
        emails
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub findings: SiteFindings,
    pub crawl_duration_ms: u64,
}

impl CrawlReport {
    pub fn empty(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            pages_fetched: 0,
            pages_failed: 0,
            findings: SiteFindings::default(),
            crawl_duration_ms: 0,
        }
    }
}

/// Outbound links from one page, split by whether the anchor looked
/// reservation-related. Priority links are enqueued ahead of normal ones.
#[derive(Debug, Default)]
pub struct LinkBuckets {
    pub priority: Vec<String>,
    pub normal: Vec<String>,
}
