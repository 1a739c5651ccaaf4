// src/export.rs
use crate::models::EnrichedVenue;
use chrono::Utc;
use std::io::Write;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct VenueExporter;

impl VenueExporter {
    pub fn new() -> Self {
        Self
    }

    /// Writes one row per discovered email address, so a venue with three
    /// emails appears three times. A venue with none still gets a single row
    /// with an empty Email column.
    pub async fn export_to_csv(&self, venues: &[EnrichedVenue], filename: &str) -> Result<usize> {
        // Ensure directory exists
        if let Some(parent) = std::path::Path::new(filename).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(filename)?;

        writeln!(
            file,
            "Input Name,Place Name,Address,Price Level,Types,Category,Website,Phone Number,Rating,Review Count,Opening Hours,Email,POS System,Loyalty Programs,Reservation Platform,Review Text,Review Author,Review Rating,Popular Dish/Drink,Intro Email Blurb"
        )?;

        let mut rows_written = 0;
        for venue in venues {
            let emails: Vec<&str> = if venue.emails.is_empty() {
                vec![""]
            } else {
                venue.emails.iter().map(String::as_str).collect()
            };

            for email in emails {
                let row = [
                    venue.input_name.as_str(),
                    venue.place_name.as_str(),
                    venue.address.as_str(),
                    venue.price_level.as_str(),
                    venue.types.as_str(),
                    venue.category.as_str(),
                    venue.website.as_str(),
                    venue.phone.as_str(),
                    venue.rating.as_str(),
                    venue.review_count.as_str(),
                    venue.opening_hours.as_str(),
                    email,
                    venue.pos_system.as_str(),
                    venue.loyalty_programs.as_str(),
                    venue.reservation_platform.as_str(),
                    venue.review_text.as_str(),
                    venue.review_author.as_str(),
                    venue.review_rating.as_str(),
                    venue.popular_dish.as_str(),
                    venue.intro_blurb.as_str(),
                ];
                writeln!(file, "{}", row.map(csv_field).join(","))?;
                rows_written += 1;
            }
        }

        Ok(rows_written)
    }

    pub fn generate_filename(&self, directory: &str) -> String {
        format!(
            "{}/venues_export_{}.csv",
            directory,
            Utc::now().format("%Y%m%d_%H%M%S")
        )
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn venue_with_emails(name: &str, emails: &[&str]) -> EnrichedVenue {
        let mut venue = EnrichedVenue::not_found(name);
        venue.place_name = format!("{} Restaurant", name);
        venue.category = "BB1".to_string();
        venue.popular_dish = String::new();
        venue.intro_blurb = String::new();
        venue.emails = emails.iter().map(|e| e.to_string()).collect();
        venue
    }

    #[tokio::test]
    async fn writes_one_row_per_email() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let exporter = VenueExporter::new();

        let venues = vec![
            venue_with_emails("Two Mails", &["a@x.com", "b@x.com"]),
            venue_with_emails("No Mail", &[]),
        ];
        let rows = exporter
            .export_to_csv(&venues, path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(rows, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Input Name,Place Name,Address"));
        assert!(lines[1].contains("a@x.com"));
        assert!(lines[2].contains("b@x.com"));
        assert!(lines[3].starts_with("No Mail,"));
    }

    #[tokio::test]
    async fn quotes_fields_with_commas_and_quotes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let exporter = VenueExporter::new();

        let mut venue = venue_with_emails("Quoted", &["info@x.com"]);
        venue.address = "1 Main St, Suite 2".to_string();
        venue.review_text = "they said \"wow\"".to_string();
        exporter
            .export_to_csv(&[venue], path.to_str().unwrap())
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"1 Main St, Suite 2\""));
        assert!(content.contains("\"they said \"\"wow\"\"\""));
    }

    #[test]
    fn filename_is_timestamped_in_the_output_directory() {
        let exporter = VenueExporter::new();
        let name = exporter.generate_filename("out");
        assert!(name.starts_with("out/venues_export_"));
        assert!(name.ends_with(".csv"));
    }
}
