use crate::models::{EnrichedVenue, VenueStats};
use crate::site_crawler::CrawlReport;
use chrono::{DateTime, Duration, Utc};
use mobc::{Manager, Pool};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error, info};

fn log_rusqlite_error(context: &str, err: &rusqlite::Error) {
    error!("🔥 SQLite Error in {}: {:?}", context, err);

    if let rusqlite::Error::ExecuteReturnedResults = err {
        error!(
            "💥 EXECUTE_RETURNED_RESULTS: This means execute() was called on a SELECT statement!"
        );
        error!("🔧 Solution: Use query_row() or query_map() for SELECT statements");
    }
}

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        debug!("🔧 Creating SqliteManager for path: {}", db_path);
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        debug!("🔌 SqliteManager::connect() - Opening database: {}", self.db_path);

        let conn = match Connection::open(&self.db_path) {
            Ok(c) => c,
            Err(e) => {
                log_rusqlite_error("Connection::open", &e);
                return Err(e);
            }
        };

        // Some PRAGMA statements return a result row, so execute() alone
        // is not enough.
        let exec_pragma =
            |conn: &Connection, pragma: &str, name: &str| -> Result<(), rusqlite::Error> {
                match conn.execute(pragma, []) {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::ExecuteReturnedResults) => {
                        debug!("🔄 {} returned results, trying query_row", name);
                        conn.query_row(pragma, [], |_| Ok(()))
                    }
                    Err(e) => {
                        debug!("❌ {} failed with execute: {}", name, e);
                        Err(e)
                    }
                }
            };

        exec_pragma(&conn, "PRAGMA journal_mode=WAL", "PRAGMA journal_mode")?;
        exec_pragma(&conn, "PRAGMA synchronous=NORMAL", "PRAGMA synchronous")?;
        exec_pragma(&conn, "PRAGMA cache_size=1000000", "PRAGMA cache_size")?;
        exec_pragma(&conn, "PRAGMA temp_store=memory", "PRAGMA temp_store")?;
        exec_pragma(&conn, "PRAGMA mmap_size=268435456", "PRAGMA mmap_size")?;

        if let Err(e) = init_database(&conn) {
            log_rusqlite_error("init_database", &e);
            return Err(e);
        }

        debug!("✅ SqliteManager::connect() completed successfully");
        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        match conn.query_row("SELECT 1", [], |_| Ok(())) {
            Ok(_) => Ok(conn),
            Err(e) => {
                log_rusqlite_error("connection check", &e);
                Err(e)
            }
        }
    }
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    debug!("🏗️ init_database() - Creating tables and indexes...");

    create_venues_table(conn)?;
    create_crawl_results_table(conn)?;
    create_indexes(conn)?;

    debug!("✅ init_database() completed successfully");
    Ok(())
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(
    db_path: &str,
) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
    debug!("🏊 create_db_pool() - Creating connection pool for: {}", db_path);

    // Ensure directory exists
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);

    info!("✓ SQLite connection pool created: {}", db_path);
    Ok(pool)
}

fn create_venues_table(conn: &Connection) -> SqliteResult<()> {
    debug!("🍽️ Creating venues table...");
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS venues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            input_name TEXT UNIQUE NOT NULL,
            place_name TEXT,
            address TEXT,
            price_level TEXT,
            types TEXT,
            category TEXT,
            website TEXT,
            phone TEXT,
            rating TEXT,
            review_count TEXT,
            opening_hours TEXT,
            emails TEXT,
            pos_system TEXT,
            loyalty_programs TEXT,
            reservation_platform TEXT,
            review_text TEXT,
            review_author TEXT,
            review_rating TEXT,
            popular_dish TEXT,
            intro_blurb TEXT,
            enriched_at TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_crawl_results_table(conn: &Connection) -> SqliteResult<()> {
    debug!("🕷️ Creating crawl_results table...");
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS crawl_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_url TEXT NOT NULL,
            run_id TEXT,
            pages_fetched INTEGER NOT NULL,
            pages_failed INTEGER NOT NULL,
            emails_found INTEGER NOT NULL,
            findings TEXT,
            crawl_duration_ms INTEGER NOT NULL,
            crawled_at TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> SqliteResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_venues_input_name ON venues(input_name)",
        "CREATE INDEX IF NOT EXISTS idx_venues_category ON venues(category)",
        "CREATE INDEX IF NOT EXISTS idx_venues_enriched_at ON venues(enriched_at)",
        "CREATE INDEX IF NOT EXISTS idx_crawl_results_start_url ON crawl_results(start_url)",
        "CREATE INDEX IF NOT EXISTS idx_crawl_results_crawled_at ON crawl_results(crawled_at)",
    ];

    for index in indexes {
        conn.execute(index, [])?;
    }
    Ok(())
}

/// Insert or refresh one venue keyed on its input name. Existing non-empty
/// values survive an update that would blank them, so a degraded re-run
/// never erases earlier findings.
pub async fn upsert_venue(
    pool: &DbPool,
    venue: &EnrichedVenue,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    debug!("💾 upsert_venue() - Upserting venue: {}", venue.input_name);

    let conn = pool.get().await?;
    let now = Utc::now();
    let emails_json = serde_json::to_string(&venue.emails)?;

    match conn.execute(
        r#"
        INSERT INTO venues (
            input_name, place_name, address, price_level, types, category,
            website, phone, rating, review_count, opening_hours, emails,
            pos_system, loyalty_programs, reservation_platform,
            review_text, review_author, review_rating,
            popular_dish, intro_blurb, enriched_at, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)
        ON CONFLICT (input_name) DO UPDATE SET
            place_name = COALESCE(NULLIF(excluded.place_name, ''), place_name),
            address = COALESCE(NULLIF(excluded.address, ''), address),
            price_level = COALESCE(NULLIF(excluded.price_level, ''), price_level),
            types = COALESCE(NULLIF(excluded.types, ''), types),
            category = COALESCE(NULLIF(excluded.category, ''), category),
            website = COALESCE(NULLIF(excluded.website, ''), website),
            phone = COALESCE(NULLIF(excluded.phone, ''), phone),
            rating = COALESCE(NULLIF(excluded.rating, ''), rating),
            review_count = COALESCE(NULLIF(excluded.review_count, ''), review_count),
            opening_hours = COALESCE(NULLIF(excluded.opening_hours, ''), opening_hours),
            emails = COALESCE(NULLIF(excluded.emails, '[]'), emails),
            pos_system = COALESCE(NULLIF(excluded.pos_system, ''), pos_system),
            loyalty_programs = COALESCE(NULLIF(excluded.loyalty_programs, ''), loyalty_programs),
            reservation_platform = COALESCE(NULLIF(excluded.reservation_platform, ''), reservation_platform),
            review_text = COALESCE(NULLIF(excluded.review_text, ''), review_text),
            review_author = COALESCE(NULLIF(excluded.review_author, ''), review_author),
            review_rating = COALESCE(NULLIF(excluded.review_rating, ''), review_rating),
            popular_dish = COALESCE(NULLIF(excluded.popular_dish, ''), popular_dish),
            intro_blurb = COALESCE(NULLIF(excluded.intro_blurb, ''), intro_blurb),
            enriched_at = excluded.enriched_at,
            last_updated = excluded.last_updated
        "#,
        params![
            venue.input_name,
            venue.place_name,
            venue.address,
            venue.price_level,
            venue.types,
            venue.category,
            venue.website,
            venue.phone,
            venue.rating,
            venue.review_count,
            venue.opening_hours,
            emails_json,
            venue.pos_system,
            venue.loyalty_programs,
            venue.reservation_platform,
            venue.review_text,
            venue.review_author,
            venue.review_rating,
            venue.popular_dish,
            venue.intro_blurb,
            venue.enriched_at.to_rfc3339(),
            now.to_rfc3339(),
        ],
    ) {
        Ok(_) => {
            debug!("✅ Venue upserted successfully: {}", venue.input_name);
            Ok(())
        }
        Err(e) => {
            log_rusqlite_error("upsert_venue", &e);
            Err(Box::new(e))
        }
    }
}

/// Input names enriched within the last `days` days, for the skip-fresh
/// prompt on re-runs. RFC3339 strings in one timezone compare correctly as
/// text.
pub async fn get_recently_enriched(
    pool: &DbPool,
    days: i64,
) -> Result<HashSet<String>, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();

    let mut stmt = conn.prepare("SELECT input_name FROM venues WHERE enriched_at > ?")?;
    let rows = stmt.query_map([&cutoff], |row| row.get::<_, String>(0))?;

    let mut names = HashSet::new();
    for row in rows {
        names.insert(row?);
    }

    debug!("📋 {} venues enriched within the last {} days", names.len(), days);
    Ok(names)
}

pub async fn load_all_venues(
    pool: &DbPool,
) -> Result<Vec<EnrichedVenue>, Box<dyn std::error::Error + Send + Sync>> {
    debug!("📤 load_all_venues() - Loading stored venues...");

    let conn = pool.get().await?;

    let mut stmt = conn.prepare(
        "SELECT input_name, place_name, address, price_level, types, category,
                website, phone, rating, review_count, opening_hours, emails,
                pos_system, loyalty_programs, reservation_platform,
                review_text, review_author, review_rating,
                popular_dish, intro_blurb, enriched_at
         FROM venues ORDER BY input_name",
    )?;

    let venue_iter = stmt.query_map([], |row| {
        let emails_json: String = row.get(11)?;
        let enriched_at_str: String = row.get(20)?;

        let enriched_at = DateTime::parse_from_rfc3339(&enriched_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    20,
                    enriched_at_str.clone(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Utc);

        Ok(EnrichedVenue {
            input_name: row.get(0)?,
            place_name: row.get(1)?,
            address: row.get(2)?,
            price_level: row.get(3)?,
            types: row.get(4)?,
            category: row.get(5)?,
            website: row.get(6)?,
            phone: row.get(7)?,
            rating: row.get(8)?,
            review_count: row.get(9)?,
            opening_hours: row.get(10)?,
            emails: serde_json::from_str(&emails_json).unwrap_or_default(),
            pos_system: row.get(12)?,
            loyalty_programs: row.get(13)?,
            reservation_platform: row.get(14)?,
            review_text: row.get(15)?,
            review_author: row.get(16)?,
            review_rating: row.get(17)?,
            popular_dish: row.get(18)?,
            intro_blurb: row.get(19)?,
            enriched_at,
        })
    })?;

    let mut venues = Vec::new();
    for venue in venue_iter {
        venues.push(venue?);
    }

    debug!("✅ Loaded {} venues", venues.len());
    Ok(venues)
}

pub async fn insert_crawl_result(
    pool: &DbPool,
    report: &CrawlReport,
    run_id: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    let findings_json = serde_json::to_string(&report.findings)?;

    match conn.execute(
        r#"
        INSERT INTO crawl_results (
            start_url, run_id, pages_fetched, pages_failed, emails_found,
            findings, crawl_duration_ms, crawled_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            report.start_url,
            run_id,
            report.pages_fetched as i64,
            report.pages_failed as i64,
            report.findings.emails.len() as i64,
            findings_json,
            report.crawl_duration_ms as i64,
            Utc::now().to_rfc3339(),
        ],
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            log_rusqlite_error("insert_crawl_result", &e);
            Err(Box::new(e))
        }
    }
}

pub async fn get_database_stats(
    pool: &DbPool,
) -> Result<VenueStats, Box<dyn std::error::Error + Send + Sync>> {
    debug!("📊 get_database_stats() - Collecting statistics...");

    let conn = pool.get().await?;

    let count = |query: &str| -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        match conn.query_row(query, [], |row| row.get::<_, i64>(0)) {
            Ok(n) => Ok(n),
            Err(e) => {
                log_rusqlite_error(query, &e);
                Err(Box::new(e))
            }
        }
    };

    let total_venues = count("SELECT COUNT(*) FROM venues")?;
    let venues_with_website = count("SELECT COUNT(*) FROM venues WHERE website != ''")?;
    let venues_with_emails =
        count("SELECT COUNT(*) FROM venues WHERE emails != '' AND emails != '[]'")?;
    let venues_not_found = count("SELECT COUNT(*) FROM venues WHERE category = 'Not found'")?;
    let total_crawls = count("SELECT COUNT(*) FROM crawl_results")?;
    let total_pages_fetched = conn
        .query_row("SELECT SUM(pages_fetched) FROM crawl_results", [], |row| {
            row.get::<_, Option<i64>>(0)
        })?
        .unwrap_or(0);
    let avg_pages_per_crawl = conn
        .query_row("SELECT AVG(pages_fetched) FROM crawl_results", [], |row| {
            row.get::<_, Option<f64>>(0)
        })?
        .unwrap_or(0.0);

    let mut stmt =
        conn.prepare("SELECT category, COUNT(*) FROM venues GROUP BY category ORDER BY COUNT(*) DESC")?;
    let category_iter = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut by_category = Vec::new();
    for entry in category_iter {
        by_category.push(entry?);
    }

    Ok(VenueStats {
        total_venues,
        venues_with_website,
        venues_with_emails,
        venues_not_found,
        by_category,
        total_crawls,
        total_pages_fetched,
        avg_pages_per_crawl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site_crawler::SiteFindings;
    use tempfile::TempDir;

    async fn test_pool() -> (TempDir, DbPool) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("venues_test.db");
        let pool = create_db_pool(path.to_str().unwrap()).await.unwrap();
        (dir, pool)
    }

    fn sample_venue(name: &str) -> EnrichedVenue {
        EnrichedVenue {
            input_name: name.to_string(),
            place_name: format!("{} Restaurant", name),
            address: "1 Main St".to_string(),
            price_level: "2".to_string(),
            types: "restaurant, food".to_string(),
            category: "BB1".to_string(),
            website: "https://example.com".to_string(),
            phone: "(212) 555-0100".to_string(),
            rating: "4.5".to_string(),
            review_count: "120".to_string(),
            opening_hours: "Mon: 9-5".to_string(),
            emails: vec!["info@example.com".to_string()],
            pos_system: "Toast".to_string(),
            loyalty_programs: "inKind".to_string(),
            reservation_platform: "Resy".to_string(),
            review_text: "great".to_string(),
            review_author: "a".to_string(),
            review_rating: "5".to_string(),
            popular_dish: "ramen".to_string(),
            intro_blurb: "blurb".to_string(),
            enriched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_then_load_round_trips() {
        let (_dir, pool) = test_pool().await;

        upsert_venue(&pool, &sample_venue("Balthazar")).await.unwrap();
        let venues = load_all_venues(&pool).await.unwrap();

        assert_eq!(venues.len(), 1);
        let venue = &venues[0];
        assert_eq!(venue.input_name, "Balthazar");
        assert_eq!(venue.emails, vec!["info@example.com"]);
        assert_eq!(venue.reservation_platform, "Resy");
    }

    #[tokio::test]
    async fn upsert_is_keyed_on_input_name() {
        let (_dir, pool) = test_pool().await;

        upsert_venue(&pool, &sample_venue("Balthazar")).await.unwrap();
        let mut updated = sample_venue("Balthazar");
        updated.popular_dish = "steak frites".to_string();
        upsert_venue(&pool, &updated).await.unwrap();

        let venues = load_all_venues(&pool).await.unwrap();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].popular_dish, "steak frites");
    }

    #[tokio::test]
    async fn empty_fields_do_not_clobber_existing_values() {
        let (_dir, pool) = test_pool().await;

        upsert_venue(&pool, &sample_venue("Balthazar")).await.unwrap();
        let mut degraded = sample_venue("Balthazar");
        degraded.website = String::new();
        degraded.emails = Vec::new();
        upsert_venue(&pool, &degraded).await.unwrap();

        let venues = load_all_venues(&pool).await.unwrap();
        assert_eq!(venues[0].website, "https://example.com");
        assert_eq!(venues[0].emails, vec!["info@example.com"]);
    }

    #[tokio::test]
    async fn recent_enrichment_filter_uses_the_cutoff() {
        let (_dir, pool) = test_pool().await;

        upsert_venue(&pool, &sample_venue("Balthazar")).await.unwrap();

        let fresh = get_recently_enriched(&pool, 7).await.unwrap();
        assert!(fresh.contains("Balthazar"));

        let stale = get_recently_enriched(&pool, 0).await.unwrap();
        assert!(stale.is_empty());
    }

    #[tokio::test]
    async fn crawl_results_feed_stats() {
        let (_dir, pool) = test_pool().await;

        let mut findings = SiteFindings::default();
        findings.emails.insert("info@example.com".to_string());
        let report = CrawlReport {
            start_url: "https://example.com".to_string(),
            pages_fetched: 3,
            pages_failed: 1,
            findings,
            crawl_duration_ms: 42,
        };
        insert_crawl_result(&pool, &report, "run-1").await.unwrap();

        upsert_venue(&pool, &sample_venue("Balthazar")).await.unwrap();
        upsert_venue(&pool, &EnrichedVenue::not_found("Ghost Kitchen")).await.unwrap();

        let stats = get_database_stats(&pool).await.unwrap();
        assert_eq!(stats.total_venues, 2);
        assert_eq!(stats.venues_with_website, 1);
        assert_eq!(stats.venues_with_emails, 1);
        assert_eq!(stats.venues_not_found, 1);
        assert_eq!(stats.total_crawls, 1);
        assert_eq!(stats.total_pages_fetched, 3);
        assert!((stats.avg_pages_per_crawl - 3.0).abs() < f64::EPSILON);
    }
}
