//! Resolvers for the review query surface.
//!
//! Each resolver takes typed, already validated arguments, fetches the raw
//! collection from the store, runs it through the engine and packages the
//! result. Store failures propagate unchanged.

use std::sync::Arc;

use super::aggregate;
use super::engine;
use super::models::{AppSettings, PageWindow, Review, ReviewFilter, SearchRange, SearchResponse};
use super::observer::{FilterEvent, QueryField, QueryObserver, TracingObserver};
use super::store::{ReviewStore, SettingsStore};
use crate::errors::ReviewResult;

#[derive(Clone)]
pub struct QueryService {
    reviews: Arc<dyn ReviewStore>,
    settings: Arc<dyn SettingsStore>,
    observer: Arc<dyn QueryObserver>,
}

impl QueryService {
    pub fn new(reviews: Arc<dyn ReviewStore>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            reviews,
            settings,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// `review(id)`
    pub async fn review(&self, id: i64) -> ReviewResult<Option<Review>> {
        self.reviews.get_by_id(id).await
    }

    /// `reviews(searchTerm, from, to, orderBy, status)`
    pub async fn reviews(&self, filter: &ReviewFilter, window: &PageWindow) -> ReviewResult<SearchResponse> {
        let fetched = self.reviews.get_all().await?;
        Ok(self.search(QueryField::Reviews, fetched, filter, window))
    }

    /// `reviewsByProductId(productId, ...)`
    pub async fn reviews_by_product_id(
        &self,
        product_id: &str,
        filter: &ReviewFilter,
        window: &PageWindow,
    ) -> ReviewResult<SearchResponse> {
        let fetched = self.reviews.get_by_product_id(product_id).await?;
        Ok(self.search(QueryField::ReviewsByProductId, fetched, filter, window))
    }

    /// `reviewsByShopperId(shopperId, ...)`
    pub async fn reviews_by_shopper_id(
        &self,
        shopper_id: &str,
        filter: &ReviewFilter,
        window: &PageWindow,
    ) -> ReviewResult<SearchResponse> {
        let fetched = self.reviews.get_by_shopper_id(shopper_id).await?;
        Ok(self.search(QueryField::ReviewsByShopperId, fetched, filter, window))
    }

    /// `averageRatingByProductId(productId)`. Only approved reviews count
    /// when the settings require approval.
    pub async fn average_rating_by_product_id(&self, product_id: &str) -> ReviewResult<f64> {
        let reviews = self.reviews.get_by_product_id(product_id).await?;
        if reviews.is_empty() {
            return Ok(0.0);
        }
        let settings = self.settings.get_app_settings().await?;
        let countable = aggregate::countable_reviews(reviews, settings.require_approval);
        Ok(aggregate::average_rating(&countable))
    }

    /// `totalReviewsByProductId(productId)`
    pub async fn total_reviews_by_product_id(&self, product_id: &str) -> ReviewResult<i64> {
        let reviews = self.reviews.get_by_product_id(product_id).await?;
        if reviews.is_empty() {
            return Ok(0);
        }
        let settings = self.settings.get_app_settings().await?;
        Ok(aggregate::total_approved_count(
            Some(reviews.as_slice()),
            settings.require_approval,
        ))
    }

    /// `hasShopperReviewed(shopperId, productId)`
    pub async fn has_shopper_reviewed(&self, shopper_id: &str, product_id: &str) -> ReviewResult<bool> {
        self.reviews.has_review(shopper_id, product_id).await
    }

    /// `appSettings`
    pub async fn app_settings(&self) -> ReviewResult<AppSettings> {
        self.settings.get_app_settings().await
    }

    fn search(
        &self,
        field: QueryField,
        fetched: Vec<Review>,
        filter: &ReviewFilter,
        window: &PageWindow,
    ) -> SearchResponse {
        let fetched_count = fetched.len();
        let filtered = engine::filter_reviews(fetched, filter);
        let page = engine::paginate(filtered, window);

        self.observer.on_filtered(&FilterEvent {
            field,
            fetched: fetched_count,
            total: page.total,
            returned: page.items.len(),
        });

        SearchResponse {
            range: SearchRange {
                from: window.from,
                to: window.to,
                total: page.total as i64,
            },
            data: page.items,
        }
    }
}
