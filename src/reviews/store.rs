//! Collaborator seams the query layer reads from.

use async_trait::async_trait;

use super::db::DbHandle;
use super::models::{AppSettings, Review};
use crate::errors::{ReviewError, ReviewResult};

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> ReviewResult<Option<Review>>;
    async fn get_all(&self) -> ReviewResult<Vec<Review>>;
    async fn get_by_product_id(&self, product_id: &str) -> ReviewResult<Vec<Review>>;
    async fn get_by_shopper_id(&self, shopper_id: &str) -> ReviewResult<Vec<Review>>;
    async fn has_review(&self, shopper_id: &str, product_id: &str) -> ReviewResult<bool>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_app_settings(&self) -> ReviewResult<AppSettings>;
    async fn save_app_settings(&self, settings: &AppSettings) -> ReviewResult<()>;
}

#[async_trait]
impl ReviewStore for DbHandle {
    async fn get_by_id(&self, id: i64) -> ReviewResult<Option<Review>> {
        self.call(move |db| db.get_review(id))
            .await
            .map_err(ReviewError::Database)
    }

    async fn get_all(&self) -> ReviewResult<Vec<Review>> {
        self.call(|db| db.list_reviews())
            .await
            .map_err(ReviewError::Database)
    }

    async fn get_by_product_id(&self, product_id: &str) -> ReviewResult<Vec<Review>> {
        let product_id = product_id.to_string();
        self.call(move |db| db.list_reviews_by_product(&product_id))
            .await
            .map_err(ReviewError::Database)
    }

    async fn get_by_shopper_id(&self, shopper_id: &str) -> ReviewResult<Vec<Review>> {
        let shopper_id = shopper_id.to_string();
        self.call(move |db| db.list_reviews_by_shopper(&shopper_id))
            .await
            .map_err(ReviewError::Database)
    }

    async fn has_review(&self, shopper_id: &str, product_id: &str) -> ReviewResult<bool> {
        let shopper_id = shopper_id.to_string();
        let product_id = product_id.to_string();
        self.call(move |db| db.has_review(&shopper_id, &product_id))
            .await
            .map_err(ReviewError::Database)
    }
}

#[async_trait]
impl SettingsStore for DbHandle {
    async fn get_app_settings(&self) -> ReviewResult<AppSettings> {
        self.call(|db| db.get_app_settings())
            .await
            .map_err(ReviewError::Database)
    }

    async fn save_app_settings(&self, settings: &AppSettings) -> ReviewResult<()> {
        let settings = settings.clone();
        self.call(move |db| db.save_app_settings(&settings))
            .await
            .map_err(ReviewError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::db::ReviewDb;
    use crate::reviews::db::tests::new_review;

    fn seeded_handle() -> DbHandle {
        let db = ReviewDb::new_in_memory().unwrap();
        db.insert_review(&new_review("p1", "s1", 5, true)).unwrap();
        db.insert_review(&new_review("p1", "s2", 2, false)).unwrap();
        db.insert_review(&new_review("p2", "s1", 4, true)).unwrap();
        DbHandle::new(db)
    }

    #[tokio::test]
    async fn test_review_store_delegates_to_db() {
        let store = seeded_handle();
        assert_eq!(store.get_all().await.unwrap().len(), 3);
        assert_eq!(store.get_by_product_id("p1").await.unwrap().len(), 2);
        assert_eq!(store.get_by_shopper_id("s1").await.unwrap().len(), 2);
        assert_eq!(store.get_by_id(1).await.unwrap().unwrap().shopper_id, "s1");
        assert!(store.get_by_id(100).await.unwrap().is_none());
        assert!(store.has_review("s2", "p1").await.unwrap());
        assert!(!store.has_review("s2", "p2").await.unwrap());
    }

    #[tokio::test]
    async fn test_settings_store_round_trip() {
        let store = seeded_handle();
        assert!(store.get_app_settings().await.unwrap().require_approval);

        let settings = AppSettings {
            require_approval: false,
            ..Default::default()
        };
        store.save_app_settings(&settings).await.unwrap();
        assert!(!store.get_app_settings().await.unwrap().require_approval);
    }
}
