// src/cli/run_export.rs
use crate::database::load_all_venues;
use crate::export::VenueExporter;
use crate::models::CliApp;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

impl CliApp {
    pub async fn run_export(&self) -> Result<()> {
        println!("\n📤 Export Enriched Venues");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let venues = load_all_venues(&self.db_pool).await?;
        if venues.is_empty() {
            println!("❌ No venues in database");
            println!("💡 Run an enrichment first");
            return Ok(());
        }

        let exporter = VenueExporter::new();
        let filename = exporter.generate_filename(&self.config.output.directory);
        let rows = exporter.export_to_csv(&venues, &filename).await?;

        println!("✅ Exported {} venues as {} rows", venues.len(), rows);
        println!("📄 File: {}", filename);

        let with_emails = venues.iter().filter(|v| !v.emails.is_empty()).count();
        let not_found = venues.iter().filter(|v| v.category == "Not found").count();
        println!("\n📋 Breakdown:");
        println!("  📧 Venues with emails: {}", with_emails);
        println!("  ❓ Venues not found: {}", not_found);

        Ok(())
    }
}
