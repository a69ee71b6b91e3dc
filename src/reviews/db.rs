use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use super::models::*;

const APP_SETTINGS_KEY: &str = "app_settings";

const REVIEW_COLUMNS: &str = "id, product_id, shopper_id, rating, title, text, reviewer_name, sku, location, locale, verified_purchaser, approved, review_date_time";

/// Async-safe handle to the reviews database.
///
/// Wraps `ReviewDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O never
/// ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<ReviewDb>>,
}

impl DbHandle {
    pub fn new(db: ReviewDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&ReviewDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }
}

pub struct ReviewDb {
    conn: Connection,
}

impl ReviewDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.run_migrations().context("Failed to run migrations")?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.run_migrations().context("Failed to run migrations")?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS reviews (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    product_id TEXT NOT NULL,
                    shopper_id TEXT NOT NULL,
                    rating INTEGER NOT NULL,
                    title TEXT NOT NULL DEFAULT '',
                    text TEXT NOT NULL DEFAULT '',
                    reviewer_name TEXT NOT NULL DEFAULT '',
                    sku TEXT,
                    location TEXT,
                    locale TEXT,
                    verified_purchaser INTEGER NOT NULL DEFAULT 0,
                    approved INTEGER NOT NULL DEFAULT 0,
                    review_date_time TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_reviews_product ON reviews(product_id);
                CREATE INDEX IF NOT EXISTS idx_reviews_shopper ON reviews(shopper_id);
                CREATE INDEX IF NOT EXISTS idx_reviews_shopper_product ON reviews(shopper_id, product_id);

                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Review writes ─────────────────────────────────────────────────

    pub fn insert_review(&self, review: &NewReview) -> Result<Review> {
        let review_date_time = review.review_date_time.unwrap_or_else(Utc::now);
        self.conn
            .execute(
                "INSERT INTO reviews (id, product_id, shopper_id, rating, title, text, reviewer_name, sku, location, locale, verified_purchaser, approved, review_date_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    review.id,
                    review.product_id,
                    review.shopper_id,
                    review.rating,
                    review.title,
                    review.text,
                    review.reviewer_name,
                    review.sku,
                    review.location,
                    review.locale,
                    review.verified_purchaser,
                    review.approved,
                    review_date_time.to_rfc3339(),
                ],
            )
            .context("Failed to insert review")?;
        let id = self.conn.last_insert_rowid();
        self.get_review(id)?.context("Review not found after insert")
    }

    /// Insert all reviews in a single transaction. Either every row lands or
    /// none does.
    pub fn insert_reviews(&mut self, reviews: &[NewReview]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to start import transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO reviews (id, product_id, shopper_id, rating, title, text, reviewer_name, sku, location, locale, verified_purchaser, approved, review_date_time)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                )
                .context("Failed to prepare insert_reviews")?;
            for review in reviews {
                let review_date_time = review.review_date_time.unwrap_or_else(Utc::now);
                stmt.execute(params![
                    review.id,
                    review.product_id,
                    review.shopper_id,
                    review.rating,
                    review.title,
                    review.text,
                    review.reviewer_name,
                    review.sku,
                    review.location,
                    review.locale,
                    review.verified_purchaser,
                    review.approved,
                    review_date_time.to_rfc3339(),
                ])
                .with_context(|| {
                    format!(
                        "Failed to insert review for product {} by shopper {}",
                        review.product_id, review.shopper_id
                    )
                })?;
            }
        }
        tx.commit().context("Failed to commit import")?;
        Ok(reviews.len())
    }

    // ── Review queries ────────────────────────────────────────────────

    pub fn get_review(&self, id: i64) -> Result<Option<Review>> {
        let mut reviews = self.query_reviews("WHERE id = ?1", params![id])?;
        Ok(reviews.pop())
    }

    pub fn list_reviews(&self) -> Result<Vec<Review>> {
        self.query_reviews("", params![])
    }

    pub fn list_reviews_by_product(&self, product_id: &str) -> Result<Vec<Review>> {
        self.query_reviews("WHERE product_id = ?1", params![product_id])
    }

    pub fn list_reviews_by_shopper(&self, shopper_id: &str) -> Result<Vec<Review>> {
        self.query_reviews("WHERE shopper_id = ?1", params![shopper_id])
    }

    pub fn has_review(&self, shopper_id: &str, product_id: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM reviews WHERE shopper_id = ?1 AND product_id = ?2)",
                params![shopper_id, product_id],
                |row| row.get::<_, bool>(0),
            )
            .context("Failed to query has_review")
    }

    pub fn count_reviews(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))
            .context("Failed to count reviews")
    }

    fn query_reviews(&self, clause: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Review>> {
        let sql = format!("SELECT {} FROM reviews {} ORDER BY id", REVIEW_COLUMNS, clause);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare review query")?;
        let rows = stmt
            .query_map(args, |row| {
                Ok(ReviewRow {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    shopper_id: row.get(2)?,
                    rating: row.get(3)?,
                    title: row.get(4)?,
                    text: row.get(5)?,
                    reviewer_name: row.get(6)?,
                    sku: row.get(7)?,
                    location: row.get(8)?,
                    locale: row.get(9)?,
                    verified_purchaser: row.get(10)?,
                    approved: row.get(11)?,
                    review_date_time: row.get(12)?,
                })
            })
            .context("Failed to query reviews")?;
        let mut reviews = Vec::new();
        for row in rows {
            let r = row.context("Failed to read review row")?;
            reviews.push(r.into_review()?);
        }
        Ok(reviews)
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?1")
            .context("Failed to prepare get_setting")?;
        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("Failed to query setting")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("Failed to read setting")?)),
            None => Ok(None),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                params![key, value],
            )
            .context("Failed to upsert setting")?;
        Ok(())
    }

    /// Stored settings, or defaults when none were ever saved.
    pub fn get_app_settings(&self) -> Result<AppSettings> {
        match self.get_setting(APP_SETTINGS_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Failed to parse stored app settings"),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn save_app_settings(&self, settings: &AppSettings) -> Result<()> {
        let json = serde_json::to_string(settings).context("Failed to serialize app settings")?;
        self.set_setting(APP_SETTINGS_KEY, &json)
    }
}

// ── Row mapping ───────────────────────────────────────────────────────

/// Intermediate row struct for reviews.
struct ReviewRow {
    id: i64,
    product_id: String,
    shopper_id: String,
    rating: i32,
    title: String,
    text: String,
    reviewer_name: String,
    sku: Option<String>,
    location: Option<String>,
    locale: Option<String>,
    verified_purchaser: bool,
    approved: bool,
    review_date_time: String,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review> {
        let review_date_time = DateTime::parse_from_rfc3339(&self.review_date_time)
            .with_context(|| format!("Failed to parse review_date_time for review {}", self.id))?
            .with_timezone(&Utc);
        Ok(Review {
            id: self.id,
            product_id: self.product_id,
            shopper_id: self.shopper_id,
            rating: self.rating,
            title: self.title,
            text: self.text,
            reviewer_name: self.reviewer_name,
            sku: self.sku,
            location: self.location,
            locale: self.locale,
            verified_purchaser: self.verified_purchaser,
            approved: self.approved,
            review_date_time,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn new_review(product_id: &str, shopper_id: &str, rating: i32, approved: bool) -> NewReview {
        NewReview {
            id: None,
            product_id: product_id.to_string(),
            shopper_id: shopper_id.to_string(),
            rating,
            title: format!("{} on {}", shopper_id, product_id),
            text: String::new(),
            reviewer_name: shopper_id.to_string(),
            sku: None,
            location: None,
            locale: None,
            verified_purchaser: false,
            approved,
            review_date_time: None,
        }
    }

    #[test]
    fn test_create_database_and_run_migrations() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;

        let table_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('reviews', 'settings')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(table_count, 2, "Expected 2 tables to exist");

        let index_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name IN ('idx_reviews_product', 'idx_reviews_shopper', 'idx_reviews_shopper_product')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(index_count, 3, "Expected 3 indexes to exist");

        Ok(())
    }

    #[test]
    fn test_migrations_are_idempotent() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        db.run_migrations()?;
        db.run_migrations()?;
        Ok(())
    }

    #[test]
    fn test_insert_and_get_review() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        let mut input = new_review("p1", "s1", 4, true);
        input.sku = Some("SKU-1".into());
        input.review_date_time = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        let review = db.insert_review(&input)?;
        assert!(review.id > 0);
        assert_eq!(review.product_id, "p1");
        assert_eq!(review.sku.as_deref(), Some("SKU-1"));
        assert!(review.approved);

        let fetched = db.get_review(review.id)?.expect("review should exist");
        assert_eq!(fetched, review);
        assert_eq!(
            fetched.review_date_time,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        Ok(())
    }

    #[test]
    fn test_get_missing_review_is_none() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        assert!(db.get_review(999)?.is_none());
        Ok(())
    }

    #[test]
    fn test_insert_review_keeps_explicit_id() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        let mut input = new_review("p1", "s1", 3, false);
        input.id = Some(42);
        let review = db.insert_review(&input)?;
        assert_eq!(review.id, 42);
        Ok(())
    }

    #[test]
    fn test_list_reviews_by_product_and_shopper() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        db.insert_review(&new_review("p1", "s1", 5, true))?;
        db.insert_review(&new_review("p1", "s2", 3, false))?;
        db.insert_review(&new_review("p2", "s1", 1, true))?;

        assert_eq!(db.list_reviews()?.len(), 3);

        let by_product = db.list_reviews_by_product("p1")?;
        assert_eq!(by_product.len(), 2);
        assert!(by_product.iter().all(|r| r.product_id == "p1"));

        let by_shopper = db.list_reviews_by_shopper("s1")?;
        assert_eq!(by_shopper.len(), 2);
        assert!(by_shopper.iter().all(|r| r.shopper_id == "s1"));

        assert!(db.list_reviews_by_product("nope")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_has_review_requires_exact_match() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        db.insert_review(&new_review("p1", "s1", 5, true))?;

        assert!(db.has_review("s1", "p1")?);
        assert!(!db.has_review("s1", "p2")?);
        assert!(!db.has_review("s2", "p1")?);
        assert!(!db.has_review("S1", "p1")?);
        Ok(())
    }

    #[test]
    fn test_insert_reviews_is_transactional() -> Result<()> {
        let mut db = ReviewDb::new_in_memory()?;
        let mut first = new_review("p1", "s1", 5, true);
        first.id = Some(1);
        let mut duplicate = new_review("p1", "s2", 4, true);
        duplicate.id = Some(1);

        assert!(db.insert_reviews(&[first.clone(), duplicate]).is_err());
        assert_eq!(db.count_reviews()?, 0);

        assert_eq!(db.insert_reviews(&[first])?, 1);
        assert_eq!(db.count_reviews()?, 1);
        Ok(())
    }

    #[test]
    fn test_app_settings_default_when_unset() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        assert_eq!(db.get_app_settings()?, AppSettings::default());
        Ok(())
    }

    #[test]
    fn test_save_and_load_app_settings() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        let settings = AppSettings {
            require_approval: false,
            default_open_count: 3,
            ..Default::default()
        };
        db.save_app_settings(&settings)?;
        assert_eq!(db.get_app_settings()?, settings);
        Ok(())
    }

    #[test]
    fn test_corrupt_app_settings_is_an_error() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        db.set_setting(APP_SETTINGS_KEY, "not json")?;
        assert!(db.get_app_settings().is_err());
        Ok(())
    }

    #[test]
    fn test_set_setting_overwrites_existing() -> Result<()> {
        let db = ReviewDb::new_in_memory()?;
        db.set_setting("k", "v1")?;
        db.set_setting("k", "v2")?;
        assert_eq!(db.get_setting("k")?.as_deref(), Some("v2"));
        assert_eq!(db.get_setting("missing")?, None);
        Ok(())
    }
}
