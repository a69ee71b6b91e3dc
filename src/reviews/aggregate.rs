//! Rating aggregates over an already fetched review collection.

use super::models::Review;

/// Arithmetic mean of the ratings, `0.0` when there is nothing to average.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    sum as f64 / reviews.len() as f64
}

/// Number of reviews that count toward public totals.
///
/// With `require_approval` off every review counts; with it on only approved
/// ones do. An absent collection counts as zero.
pub fn total_approved_count(reviews: Option<&[Review]>, require_approval: bool) -> i64 {
    let Some(reviews) = reviews.filter(|r| !r.is_empty()) else {
        return 0;
    };
    if require_approval {
        reviews.iter().filter(|r| r.approved).count() as i64
    } else {
        reviews.len() as i64
    }
}

/// Reviews that count toward public aggregates under the given approval rule.
pub fn countable_reviews(reviews: Vec<Review>, require_approval: bool) -> Vec<Review> {
    if require_approval {
        reviews.into_iter().filter(|r| r.approved).collect()
    } else {
        reviews
    }
}
