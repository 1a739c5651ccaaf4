use crate::site_crawler::CrawlLimits;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub input: InputConfig,
    pub places: PlacesConfig,
    pub ai: AiConfig,
    pub crawler: CrawlerConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub file: String,
    /// Venues enriched within this many days can be skipped on a re-run.
    pub refresh_days: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlacesConfig {
    pub base_url: String,
    /// "lat,lng" center the text search is biased around.
    pub location_bias: String,
    pub radius_meters: u32,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    pub max_pages: usize,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub progress_interval: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl CrawlerConfig {
    pub fn limits(&self) -> CrawlLimits {
        CrawlLimits {
            max_pages: self.max_pages,
            timeout_seconds: self.request_timeout_seconds,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            places: PlacesConfig::default(),
            ai: AiConfig::default(),
            crawler: CrawlerConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file: "input.csv".to_string(),
            refresh_days: 7,
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            location_bias: "40.7128,-74.0060".to_string(),
            radius_meters: 30000,
            request_timeout_seconds: 10,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-2".to_string(),
            max_tokens: 300,
            max_retries: 3,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            request_timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            progress_interval: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "out".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/venues.db".to_string(),
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_yaml_config_parses() {
        let yaml = r#"
input:
  file: venues.csv
  refresh_days: 3
places:
  base_url: https://maps.googleapis.com
  location_bias: "40.7128,-74.0060"
  radius_meters: 30000
  request_timeout_seconds: 10
ai:
  base_url: https://api.anthropic.com
  model: claude-2
  max_tokens: 300
  max_retries: 3
  request_timeout_seconds: 30
crawler:
  max_pages: 4
  request_timeout_seconds: 10
logging:
  level: debug
  progress_interval: 5
output:
  directory: out
database:
  path: data/venues.db
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.input.file, "venues.csv");
        assert_eq!(config.crawler.max_pages, 4);
        assert_eq!(config.places.location_bias, "40.7128,-74.0060");
    }

    #[test]
    fn default_crawler_limits_match_config() {
        let limits = CrawlerConfig::default().limits();
        assert_eq!(limits.max_pages, 10);
        assert_eq!(limits.timeout_seconds, 10);
    }
}
