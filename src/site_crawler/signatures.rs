// src/site_crawler/signatures.rs
use crate::site_crawler::types::SiteFindings;
use tracing::debug;

// Literal markers left in page markup by third-party embeds. Checks are
// case-sensitive: "Resy" and "Tock" deliberately catch visible branding text
// as well as script URLs.
const RESY_TRIGGERS: [&str; 4] = [
    r#"id="resy_button_container""#,
    "widgets.resy.com",
    "resy.com",
    "Resy",
];
const OPENTABLE_TRIGGERS: [&str; 2] = ["OpenTable", "opentable.com"];
const TOCK_TRIGGERS: [&str; 2] = ["Tock", "exploretock.com"];

const TOAST_TRIGGER: &str = "www.toasttab.com";
const INKIND_TRIGGER: &str = "inkindscript.com";
const SPOTON_TRIGGER: &str = "spoton.com";

/// Which reservation platform the markup embeds, probed in priority order
/// Resy, OpenTable, Tock.
pub fn detect_reservation_platform(markup: &str) -> Option<&'static str> {
    if RESY_TRIGGERS.iter().any(|t| markup.contains(t)) {
        return Some("Resy");
    }
    if OPENTABLE_TRIGGERS.iter().any(|t| markup.contains(t)) {
        return Some("OpenTable");
    }
    if TOCK_TRIGGERS.iter().any(|t| markup.contains(t)) {
        return Some("Tock");
    }
    None
}

/// Fold one page's vendor signatures into the crawl findings.
///
/// POS system and reservation platform are first-wins across the whole
/// crawl: whatever an earlier page detected stays. Loyalty programs
/// accumulate as a set.
pub fn apply_signatures(markup: &str, findings: &mut SiteFindings) {
    if findings.pos_system.is_none() && markup.contains(TOAST_TRIGGER) {
        debug!("POS signature hit: Toast");
        findings.pos_system = Some("Toast".to_string());
    }

    if markup.contains(INKIND_TRIGGER) {
        findings.loyalty_programs.insert("inKind".to_string());
    }
    if markup.contains(SPOTON_TRIGGER) {
        findings.loyalty_programs.insert("SpotOn".to_string());
    }

    if findings.reservation_platform.is_none() {
        if let Some(platform) = detect_reservation_platform(markup) {
            debug!("Reservation signature hit: {}", platform);
            findings.reservation_platform = Some(platform.to_string());
        }
    }
}
