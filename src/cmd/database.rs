//! Database commands — `reviews-ratings init` and `reviews-ratings import`.

use std::path::Path;

use anyhow::{Context, Result, bail};

use reviews_ratings::reviews::db::ReviewDb;
use reviews_ratings::reviews::models::NewReview;

/// Open the database, creating its parent directory first.
pub fn open_db(db_path: &Path) -> Result<ReviewDb> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    ReviewDb::new(db_path)
        .with_context(|| format!("Failed to open reviews database at {}", db_path.display()))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    open_db(db_path)?;
    println!("Reviews database initialized at {}", db_path.display());
    Ok(())
}

pub fn cmd_import(file: &Path, db_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file: {}", file.display()))?;
    let reviews: Vec<NewReview> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse reviews from {}", file.display()))?;

    validate_reviews(&reviews)?;

    let mut db = open_db(db_path)?;
    let imported = db.insert_reviews(&reviews)?;
    tracing::info!(imported, file = %file.display(), "imported reviews");
    println!("Imported {} reviews into {}", imported, db_path.display());
    Ok(())
}

fn validate_reviews(reviews: &[NewReview]) -> Result<()> {
    for (index, review) in reviews.iter().enumerate() {
        if review.product_id.trim().is_empty() {
            bail!("Review #{} has an empty productId", index);
        }
        if review.shopper_id.trim().is_empty() {
            bail!("Review #{} has an empty shopperId", index);
        }
        if !(1..=5).contains(&review.rating) {
            bail!(
                "Review #{} has rating {}; ratings must be between 1 and 5",
                index,
                review.rating
            );
        }
    }
    Ok(())
}
