//! In-memory review query engine.
//!
//! Filtering and pagination are deliberately separate steps: callers need the
//! filtered count (`total`) before the `[from, to)` window truncates the list.

use std::cmp::Ordering;

use super::models::{OrderBy, Page, PageWindow, Review, ReviewFilter, SortDirection, SortKey};

/// Apply search term, approval status and ordering to `reviews`.
///
/// The sort is stable, so reviews that compare equal keep their input order.
pub fn filter_reviews(reviews: Vec<Review>, filter: &ReviewFilter) -> Vec<Review> {
    let needle = filter
        .search_term
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<Review> = reviews
        .into_iter()
        .filter(|r| filter.status.matches(r))
        .filter(|r| match needle.as_deref() {
            Some(term) => matches_search_term(r, term),
            None => true,
        })
        .collect();

    if let Some(order) = filter.order_by {
        sort_reviews(&mut filtered, order);
    }
    filtered
}

/// Slice the `[from, to)` window out of an already filtered sequence.
pub fn paginate(reviews: Vec<Review>, window: &PageWindow) -> Page {
    let total = reviews.len();
    let start = window.from.unwrap_or(0).max(0) as usize;
    let end = match window.to {
        Some(to) => (to.max(0) as usize).min(total),
        None => total,
    };

    if start >= total || start > end {
        return Page {
            items: Vec::new(),
            total,
        };
    }

    let items = reviews.into_iter().skip(start).take(end - start).collect();
    Page { items, total }
}

/// `term` must already be lowercased.
fn matches_search_term(review: &Review, term: &str) -> bool {
    let fields = [
        Some(review.title.as_str()),
        Some(review.text.as_str()),
        Some(review.reviewer_name.as_str()),
        Some(review.product_id.as_str()),
        Some(review.shopper_id.as_str()),
        review.sku.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(term))
}

fn sort_reviews(reviews: &mut [Review], order: OrderBy) {
    reviews.sort_by(|a, b| {
        let ord = compare_by(a, b, order.key);
        match order.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_by(a: &Review, b: &Review, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::ProductId => a.product_id.cmp(&b.product_id),
        SortKey::Rating => a.rating.cmp(&b.rating),
        SortKey::Date => a.review_date_time.cmp(&b.review_date_time),
        SortKey::ReviewerName => a
            .reviewer_name
            .to_lowercase()
            .cmp(&b.reviewer_name.to_lowercase()),
    }
}
