use crate::{database::get_database_stats, models::CliApp};
use tracing::{debug, error};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

impl CliApp {
    pub async fn show_database_stats(&self) -> Result<()> {
        debug!("📊 show_database_stats() - Starting...");

        println!("\n📊 Database Statistics");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let stats = match get_database_stats(&self.db_pool).await {
            Ok(stats) => stats,
            Err(e) => {
                error!("💥 get_database_stats failed: {}", e);
                if let Some(rusqlite_err) = e.downcast_ref::<rusqlite::Error>() {
                    error!("🔥 Specific rusqlite error: {:?}", rusqlite_err);
                }
                return Err(e);
            }
        };

        println!("🍽️  Total venues: {}", stats.total_venues);
        println!("🌐 Venues with a website: {}", stats.venues_with_website);
        println!("📧 Venues with emails: {}", stats.venues_with_emails);
        println!("❓ Venues not found: {}", stats.venues_not_found);

        if !stats.by_category.is_empty() {
            println!("\n🏷️  By Category:");
            for (category, count) in &stats.by_category {
                println!(
                    "   {} {}: {}",
                    match category.as_str() {
                        "BB1" => "🍽️",
                        "BB2" => "🥡",
                        "BB3" => "🍸",
                        "Not found" => "❓",
                        _ => "📦",
                    },
                    category,
                    count
                );
            }
        }

        println!("\n🕷️  Crawls recorded: {}", stats.total_crawls);
        if stats.total_crawls > 0 {
            println!("📄 Pages fetched: {}", stats.total_pages_fetched);
            println!(
                "📈 Average pages per crawl: {:.1}",
                stats.avg_pages_per_crawl
            );
        }

        // Email yield rate
        if stats.total_venues > 0 {
            let email_percentage = (stats.venues_with_emails * 100) / stats.total_venues;
            println!("\n📈 Email yield: {}%", email_percentage);
        }

        debug!("✅ show_database_stats() completed successfully");
        Ok(())
    }
}
