// src/site_crawler/links.rs
use crate::site_crawler::types::LinkBuckets;
use scraper::{Html, Selector};
use url::Url;

const PRIORITY_KEYWORDS: [&str; 5] = ["reservation", "book", "resy", "opentable", "tock"];
const BLOCKED_EXTENSIONS: [&str; 3] = [".pdf", ".jpg", ".png"];

/// Enumerate anchors on a page and bucket the ones worth following.
///
/// Hrefs resolve against the page URL, so relative and fragment links work.
/// Only links whose host matches `base_host` exactly survive; mailto:,
/// tel: and friends fall out naturally because they carry no host. Anchors
/// whose text or URL mention reservations get the priority bucket, which the
/// crawl loop enqueues ahead of the rest.
pub fn collect_links(document: &Html, page_url: &str, base_host: &str) -> LinkBuckets {
    let link_selector = Selector::parse("a[href]").unwrap();
    let base = Url::parse(page_url).ok();
    let mut buckets = LinkBuckets::default();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute) = resolve_href(href, base.as_ref()) {
                if absolute.host_str() != Some(base_host) {
                    continue;
                }
                if has_blocked_extension(absolute.path()) {
                    continue;
                }

                let anchor_text = element.text().collect::<String>().to_lowercase();
                let absolute_str = absolute.to_string();
                let url_lower = absolute_str.to_lowercase();

                if PRIORITY_KEYWORDS
                    .iter()
                    .any(|k| anchor_text.contains(k) || url_lower.contains(k))
                {
                    buckets.priority.push(absolute_str);
                } else {
                    buckets.normal.push(absolute_str);
                }
            }
        }
    }

    buckets
}

fn resolve_href(href: &str, base: Option<&Url>) -> Option<Url> {
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(_) => base.and_then(|b| b.join(href).ok()),
    }
}

fn has_blocked_extension(path: &str) -> bool {
    BLOCKED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
