// src/cli/run_crawl_single.rs
use crate::database::insert_crawl_result;
use crate::models::CliApp;
use dialoguer::{theme::ColorfulTheme, Input};
use uuid::Uuid;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

impl CliApp {
    pub async fn run_crawl_single(&self) -> Result<()> {
        println!("\n🕷️  Single Site Crawl");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let url: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Website URL")
            .interact_text()?;

        if !url.starts_with("http") {
            println!("⚠️  Invalid URL format, expected http:// or https://");
            return Ok(());
        }

        let max_pages: usize = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Maximum pages to fetch")
            .default(self.config.crawler.max_pages)
            .interact_text()?;

        let report = self.crawler.crawl_site(&url, max_pages).await;

        println!("\n📊 Crawl Results");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("📄 Pages fetched: {}", report.pages_fetched);
        if report.pages_failed > 0 {
            println!("❌ Pages failed: {}", report.pages_failed);
        }
        println!(
            "⏱️  Duration: {:.2}s",
            report.crawl_duration_ms as f64 / 1000.0
        );

        let findings = &report.findings;
        if findings.is_empty() {
            println!("\n❓ No contact signals found");
        } else {
            if !findings.emails.is_empty() {
                println!("\n📧 Emails:");
                for email in findings.sorted_emails() {
                    println!("  • {}", email);
                }
            }
            if let Some(pos) = &findings.pos_system {
                println!("💳 POS system: {}", pos);
            }
            if !findings.loyalty_programs.is_empty() {
                println!("🎁 Loyalty programs: {}", findings.loyalty_joined());
            }
            if let Some(platform) = &findings.reservation_platform {
                println!("🍴 Reservation platform: {}", platform);
            }
        }

        let run_id = Uuid::new_v4().to_string();
        insert_crawl_result(&self.db_pool, &report, &run_id).await?;
        println!("\n💾 Crawl result saved to database");

        Ok(())
    }
}
