use tracing::info;

use crate::ai::AiHelper;
use crate::config::Config;
use crate::database::DbPool;
use crate::models::CliApp;
use crate::places::PlacesClient;
use crate::site_crawler::SiteCrawler;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub enum MenuAction {
    EnrichVenues,
    CrawlSingleSite,
    ExportVenues,
    ShowStats,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::EnrichVenues => {
                write!(f, "🍽️  Enrich venues from the input list")
            }
            MenuAction::CrawlSingleSite => {
                write!(f, "🕷️  Crawl a single website for contact signals")
            }
            MenuAction::ExportVenues => write!(f, "📤 Export enriched venues to CSV"),
            MenuAction::ShowStats => write!(f, "📊 Show database statistics"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

impl CliApp {
    pub async fn new(config: Config, db_pool: DbPool) -> Result<Self> {
        let maps_api_key = std::env::var("MAPS_API_KEY").ok();
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();

        let places = PlacesClient::new(&config.places, maps_api_key);
        let ai = AiHelper::new(&config.ai, anthropic_api_key);
        let crawler = SiteCrawler::with_limits(&config.crawler.limits());

        info!("Venue Scout initialized");

        Ok(Self {
            config,
            db_pool,
            places,
            ai,
            crawler,
        })
    }
}
