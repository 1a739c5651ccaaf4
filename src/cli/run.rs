use dialoguer::{theme::ColorfulTheme, Select};

use crate::{
    cli::cli::MenuAction,
    models::{CliApp, Result},
};
use tracing::error;

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🚀 Welcome to Venue Scout!");
        println!("═══════════════════════════════════════");

        // Show initial stats
        self.show_database_stats().await?;

        loop {
            let actions = vec![
                MenuAction::EnrichVenues,
                MenuAction::CrawlSingleSite,
                MenuAction::ExportVenues,
                MenuAction::ShowStats,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::EnrichVenues => {
                    if let Err(e) = self.run_enrich().await {
                        error!("Enrichment failed: {}", e);
                    }
                }
                MenuAction::CrawlSingleSite => {
                    if let Err(e) = self.run_crawl_single().await {
                        error!("Crawl failed: {}", e);
                    }
                }
                MenuAction::ExportVenues => {
                    if let Err(e) = self.run_export().await {
                        error!("Export failed: {}", e);
                    }
                }
                MenuAction::ShowStats => {
                    if let Err(e) = self.show_database_stats().await {
                        error!("Failed to show stats: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Venue Scout!");
                    break;
                }
            }
        }

        Ok(())
    }
}
