use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ai::AiHelper, config::Config, database::DbPool, places::PlacesClient,
    site_crawler::SiteCrawler,
};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One enriched venue, flattened for storage and export. Numeric upstream
/// fields are kept as display strings because every consumer is tabular.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedVenue {
    pub input_name: String,
    pub place_name: String,
    pub address: String,
    pub price_level: String,
    pub types: String,
    pub category: String,
    pub website: String,
    pub phone: String,
    pub rating: String,
    pub review_count: String,
    pub opening_hours: String,
    pub emails: Vec<String>,
    pub pos_system: String,
    pub loyalty_programs: String,
    pub reservation_platform: String,
    pub review_text: String,
    pub review_author: String,
    pub review_rating: String,
    pub popular_dish: String,
    pub intro_blurb: String,
    pub enriched_at: DateTime<Utc>,
}

impl EnrichedVenue {
    /// Placeholder record for a name the place search could not match.
    pub fn not_found(input_name: &str) -> Self {
        Self {
            input_name: input_name.to_string(),
            place_name: String::new(),
            address: String::new(),
            price_level: String::new(),
            types: String::new(),
            category: "Not found".to_string(),
            website: String::new(),
            phone: String::new(),
            rating: String::new(),
            review_count: String::new(),
            opening_hours: String::new(),
            emails: Vec::new(),
            pos_system: String::new(),
            loyalty_programs: String::new(),
            reservation_platform: String::new(),
            review_text: String::new(),
            review_author: String::new(),
            review_rating: String::new(),
            popular_dish: "[No data]".to_string(),
            intro_blurb: "[No data]".to_string(),
            enriched_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub struct VenueStats {
    pub total_venues: i64,
    pub venues_with_website: i64,
    pub venues_with_emails: i64,
    pub venues_not_found: i64,
    pub by_category: Vec<(String, i64)>,
    pub total_crawls: i64,
    pub total_pages_fetched: i64,
    pub avg_pages_per_crawl: f64,
}

pub struct CliApp {
    pub config: Config,
    pub db_pool: DbPool,
    pub places: PlacesClient,
    pub ai: AiHelper,
    pub crawler: SiteCrawler,
}
