// src/site_crawler/crawler.rs
use crate::site_crawler::contact_extractor::ContactExtractor;
use crate::site_crawler::fetcher::fetch_page;
use crate::site_crawler::links::collect_links;
use crate::site_crawler::signatures::apply_signatures;
use crate::site_crawler::types::{CrawlLimits, CrawlReport, LinkBuckets, PageContent, SiteFindings};
use reqwest::Client;
use scraper::Html;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub struct SiteCrawler {
    client: Client,
    contact_extractor: ContactExtractor,
}

impl SiteCrawler {
    pub fn new() -> Self {
        Self::with_limits(&CrawlLimits::default())
    }

    pub fn with_limits(limits: &CrawlLimits) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; VenueScout/1.0)")
            .timeout(Duration::from_secs(limits.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            contact_extractor: ContactExtractor::new(),
        }
    }

    /// Crawl one website, breadth-first within its own host, until the
    /// frontier runs dry or `max_pages` pages have been fetched successfully.
    ///
    /// Never fails: an unusable start URL or a site of dead links simply
    /// produces a report with empty findings.
    pub async fn crawl_site(&self, start_url: &str, max_pages: usize) -> CrawlReport {
        let started = Instant::now();
        info!("🕷️  Starting crawl of {} (budget: {} pages)", start_url, max_pages);

        let base_host = match Url::parse(start_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            Some(host) => host,
            None => {
                warn!("No host in start URL {}, nothing to crawl", start_url);
                return CrawlReport::empty(start_url);
            }
        };

        let mut findings = SiteFindings::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<String> = VecDeque::new();
        frontier.push_back(start_url.to_string());

        let mut pages_fetched = 0usize;
        let mut pages_failed = 0usize;

        while pages_fetched < max_pages {
            let url = match frontier.pop_front() {
                Some(url) => url,
                None => break,
            };

            // Visited URLs are exact strings: trailing-slash or query
            // variants count as distinct pages.
            if visited.contains(&url) {
                continue;
            }
            visited.insert(url.clone());

            debug!("Crawling page {}/{}: {}", pages_fetched + 1, max_pages, url);

            let body = match fetch_page(&self.client, &url).await {
                Ok(body) => body,
                Err(e) => {
                    // Marked visited above, so this URL is forfeited for the
                    // rest of the crawl. Failures do not consume the budget.
                    warn!("Failed to fetch {}: {}", url, e);
                    pages_failed += 1;
                    continue;
                }
            };

            let buckets = self.process_page(&body, &url, &base_host, &mut findings);

            for link in buckets.priority.into_iter().chain(buckets.normal) {
                if visited.len() + frontier.len() < max_pages + 1 {
                    frontier.push_back(link);
                }
            }

            pages_fetched += 1;
        }

        let report = CrawlReport {
            start_url: start_url.to_string(),
            pages_fetched,
            pages_failed,
            findings,
            crawl_duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "🎯 Crawl complete for {}: {} pages, {} emails, {} failed in {}ms",
            start_url,
            report.pages_fetched,
            report.findings.emails.len(),
            report.pages_failed,
            report.crawl_duration_ms
        );

        report
    }

    /// Parse one page and fold what it says into the findings, returning the
    /// same-host links it offers. Sync on purpose: the parsed document never
    /// lives across an await.
    fn process_page(
        &self,
        body: &str,
        page_url: &str,
        base_host: &str,
        findings: &mut SiteFindings,
    ) -> LinkBuckets {
        let document = Html::parse_document(body);
        let page = page_content(&document);

        findings
            .emails
            .extend(self.contact_extractor.extract_emails(&page.text));
        apply_signatures(&page.markup, findings);

        collect_links(&document, page_url, base_host)
    }
}

/// Render the two views of a parsed page: concatenated text node content for
/// email scanning (no separators, matching how adjacent nodes glue together)
/// and serialized markup for the signature substring checks.
fn page_content(document: &Html) -> PageContent {
    let root = document.root_element();
    PageContent {
        text: root.text().collect::<String>(),
        markup: root.html(),
    }
}
