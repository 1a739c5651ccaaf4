// src/site_crawler/contact_extractor.rs
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Local-part characters accepted by the backward scan.
fn is_local_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'%' | b'+' | b'-')
}

const KNOWN_USERNAMES: [&str; 6] = ["info", "contact", "reservations", "sales", "support", "admin"];

/// Recovers email addresses from running page text.
///
/// Page text often loses the boundary in front of an address ("Visit our
/// homeinfo@restaurant.com"), so a plain email regex either misses the
/// address or swallows the surrounding prose. Instead this matches only the
/// domain half, scans backward to collect a raw local part, then repairs it:
/// trim to a known username suffix if one is glued on, otherwise trim to the
/// last alphabetic run.
pub struct ContactExtractor {
    domain_regex: Regex,
}

impl ContactExtractor {
    pub fn new() -> Self {
        Self {
            domain_regex: Regex::new(r"@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap(),
        }
    }

    /// Extract every recoverable email address from plain text.
    /// Pure function of the text: same input, same set.
    pub fn extract_emails(&self, text: &str) -> HashSet<String> {
        let bytes = text.as_bytes();
        let mut emails = HashSet::new();

        for m in self.domain_regex.find_iter(text) {
            let domain = &m.as_str()[1..];

            // Collect allowed characters walking backward from the '@'.
            let mut pos = m.start();
            let mut local_rev: Vec<u8> = Vec::new();
            while pos > 0 && is_local_char(bytes[pos - 1]) {
                local_rev.push(bytes[pos - 1]);
                pos -= 1;
            }
            if local_rev.is_empty() {
                continue;
            }
            local_rev.reverse();
            let raw_local: String = local_rev.iter().map(|&b| b as char).collect();

            let repaired = repair_local_part(&raw_local);
            let local = repaired.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
            if local.is_empty() {
                continue;
            }

            emails.insert(truncate_after_com(format!("{}@{}", local, domain)));
        }

        if !emails.is_empty() {
            debug!("Extracted {} emails from page text", emails.len());
        }
        emails
    }
}

/// Repair a raw local part recovered by the backward scan.
///
/// Glued prefixes are common ("homeinfo", "Contactsales"), so a known
/// username suffix wins outright. Failing that, keep the last alphabetic run
/// and drop digit/punctuation noise around it. A local part with no letters
/// at all is left alone.
fn repair_local_part(raw: &str) -> &str {
    let lowered = raw.to_ascii_lowercase();
    for username in KNOWN_USERNAMES {
        if lowered.ends_with(username) {
            return &raw[raw.len() - username.len()..];
        }
    }

    match last_alphabetic_run(raw) {
        Some((start, end)) => &raw[start..end],
        None => raw,
    }
}

/// Byte range of the last maximal `[A-Za-z]+` run, if any.
fn last_alphabetic_run(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && !bytes[end - 1].is_ascii_alphabetic() {
        end -= 1;
    }
    if end == 0 {
        return None;
    }
    let mut start = end;
    while start > 0 && bytes[start - 1].is_ascii_alphabetic() {
        start -= 1;
    }
    Some((start, end))
}

/// Domains sometimes capture trailing noise ("place.comJoin"); anything past
/// the first ".com" is cut. Addresses without ".com" pass through unchanged.
fn truncate_after_com(mut email: String) -> String {
    if let Some(idx) = email.find(".com") {
        email.truncate(idx + 4);
    }
    email
}
