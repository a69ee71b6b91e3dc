//! Observability hook for query resolution.
//!
//! Resolvers report how many reviews survived filtering and how many were
//! returned after pagination. The default observer turns that into a
//! structured `tracing` event; tests plug in a recorder.

use serde::Serialize;

/// Which query field produced a [`FilterEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryField {
    Reviews,
    ReviewsByProductId,
    ReviewsByShopperId,
}

impl QueryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::ReviewsByProductId => "reviewsByProductId",
            Self::ReviewsByShopperId => "reviewsByShopperId",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEvent {
    pub field: QueryField,
    /// Reviews fetched from the store before filtering.
    pub fetched: usize,
    /// Reviews left after filtering, before the window.
    pub total: usize,
    /// Reviews in the returned window.
    pub returned: usize,
}

pub trait QueryObserver: Send + Sync {
    fn on_filtered(&self, event: &FilterEvent);
}

/// Emits each event at `debug` level under the `reviews::query` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl QueryObserver for TracingObserver {
    fn on_filtered(&self, event: &FilterEvent) {
        tracing::debug!(
            target: "reviews::query",
            field = event.field.as_str(),
            fetched = event.fetched,
            total = event.total,
            returned = event.returned,
            "filtered reviews"
        );
    }
}
