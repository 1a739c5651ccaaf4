// src/cli/run_enrich.rs
use crate::classify::classify_service_type;
use crate::database::{get_recently_enriched, insert_crawl_result, upsert_venue};
use crate::input::load_venue_names;
use crate::models::{CliApp, EnrichedVenue};
use crate::site_crawler::SiteFindings;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tracing::{error, info, warn};
use uuid::Uuid;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

impl CliApp {
    pub async fn run_enrich(&self) -> Result<()> {
        println!("\n🍽️  Venue Enrichment");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let names = load_venue_names(&self.config.input.file).await?;
        if names.is_empty() {
            println!("❌ No venue names found in {}", self.config.input.file);
            return Ok(());
        }
        println!(
            "📋 Loaded {} venue names from {}",
            names.len(),
            self.config.input.file
        );

        // Skip venues enriched recently unless the user asks for a full re-run
        let fresh = get_recently_enriched(&self.db_pool, self.config.input.refresh_days).await?;
        let mut to_process: Vec<String> = names
            .iter()
            .filter(|name| !fresh.contains(*name))
            .cloned()
            .collect();

        let skipped = names.len() - to_process.len();
        if skipped > 0 {
            println!(
                "📋 {} venues were already enriched within the last {} days",
                skipped, self.config.input.refresh_days
            );
            let re_enrich = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Re-enrich those {} venues anyway?", skipped))
                .default(false)
                .interact()?;
            if re_enrich {
                to_process = names.clone();
            }
        }

        if to_process.is_empty() {
            println!("✅ All venues are fresh, nothing to do");
            return Ok(());
        }

        if !self.places.has_api_key() {
            println!("❌ MAPS_API_KEY is not set, cannot look up venues");
            println!("💡 Add it to your .env file and try again");
            return Ok(());
        }

        println!(
            "\n🎯 Enriching {} venues, crawling up to {} pages per site",
            to_process.len(),
            self.config.crawler.max_pages
        );

        let run_id = Uuid::new_v4().to_string();
        let start_time = std::time::Instant::now();
        let total = to_process.len();
        let mut enriched = 0usize;
        let mut not_found = 0usize;
        let mut search_failures = 0usize;
        let mut emails_found = 0usize;

        for (index, name) in to_process.iter().enumerate() {
            println!("\n[{}/{}] 🍽️  {}", index + 1, total, name);

            let summary = match self.places.search_venue(name).await {
                Ok(Some(summary)) => summary,
                Ok(None) => {
                    println!("  ❓ No match found");
                    upsert_venue(&self.db_pool, &EnrichedVenue::not_found(name)).await?;
                    not_found += 1;
                    continue;
                }
                Err(e) => {
                    error!("Search failed for '{}': {}", name, e);
                    upsert_venue(&self.db_pool, &EnrichedVenue::not_found(name)).await?;
                    search_failures += 1;
                    continue;
                }
            };

            let place_id = match summary.place_id {
                Some(id) => id,
                None => {
                    warn!("Search result for '{}' has no place id, skipping", name);
                    continue;
                }
            };

            let details = match self.places.place_details(&place_id).await {
                Some(details) => details,
                None => {
                    warn!("No details available for '{}', skipping", name);
                    continue;
                }
            };

            let category = classify_service_type(&details.types);
            println!("  ✅ {} ({})", details.name, category);

            let popular_dish = self
                .ai
                .find_popular_dish(&details.name, &details.reviews)
                .await;
            let intro_blurb = self
                .ai
                .generate_intro(&details.name, &details.reviews, &popular_dish)
                .await;

            let findings = if details.website.is_empty() {
                println!("  ⚠️  No website listed, skipping crawl");
                SiteFindings::default()
            } else {
                let report = self
                    .crawler
                    .crawl_site(&details.website, self.config.crawler.max_pages)
                    .await;
                println!(
                    "  🕷️  Crawled {} pages, found {} emails",
                    report.pages_fetched,
                    report.findings.emails.len()
                );
                if let Err(e) = insert_crawl_result(&self.db_pool, &report, &run_id).await {
                    error!("Failed to save crawl result for {}: {}", details.website, e);
                }
                report.findings
            };

            emails_found += findings.emails.len();

            let top_review = details.most_relevant_review();
            let venue = EnrichedVenue {
                input_name: name.clone(),
                place_name: details.name.clone(),
                address: details.formatted_address.clone(),
                price_level: details
                    .price_level
                    .map(|level| level.to_string())
                    .unwrap_or_default(),
                types: details.types.join(", "),
                category: category.to_string(),
                website: details.website.clone(),
                phone: details.formatted_phone_number.clone(),
                rating: details.rating.map(|r| r.to_string()).unwrap_or_default(),
                review_count: details
                    .user_ratings_total
                    .map(|count| count.to_string())
                    .unwrap_or_default(),
                opening_hours: details.opening_hours_joined(),
                emails: findings.sorted_emails(),
                pos_system: findings.pos_system.clone().unwrap_or_default(),
                loyalty_programs: findings.loyalty_joined(),
                reservation_platform: findings.reservation_platform.clone().unwrap_or_default(),
                review_text: top_review.map(|r| r.text.clone()).unwrap_or_default(),
                review_author: top_review.map(|r| r.author_name.clone()).unwrap_or_default(),
                review_rating: top_review
                    .and_then(|r| r.rating)
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
                popular_dish,
                intro_blurb,
                enriched_at: chrono::Utc::now(),
            };

            upsert_venue(&self.db_pool, &venue).await?;
            enriched += 1;

            let interval = self.config.logging.progress_interval.max(1);
            if (index + 1) % interval == 0 {
                info!("📊 Progress: {}/{} venues processed", index + 1, total);
            }
        }

        let duration = start_time.elapsed();

        println!("\n🎉 Enrichment Summary");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("✅ Enriched: {}", enriched);
        println!("❓ Not found: {}", not_found);
        if search_failures > 0 {
            println!("❌ Search failures: {}", search_failures);
        }
        println!("📧 Emails discovered: {}", emails_found);
        println!("⏱️  Total time: {:.2}s", duration.as_secs_f64());

        Ok(())
    }
}
