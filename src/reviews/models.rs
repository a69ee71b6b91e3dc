use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{ReviewError, ReviewResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub product_id: String,
    pub shopper_id: String,
    pub rating: i32,
    pub title: String,
    pub text: String,
    pub reviewer_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub verified_purchaser: bool,
    #[serde(default)]
    pub approved: bool,
    pub review_date_time: DateTime<Utc>,
}

/// Input shape for bulk imports; `id` and timestamp are assigned by the store
/// when missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(default)]
    pub id: Option<i64>,
    pub product_id: String,
    pub shopper_id: String,
    pub rating: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reviewer_name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub verified_purchaser: bool,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub review_date_time: Option<DateTime<Utc>>,
}

// ── Query parameters ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalFilter {
    #[default]
    Any,
    Approved,
    Unapproved,
}

impl ApprovalFilter {
    pub fn matches(&self, review: &Review) -> bool {
        match self {
            Self::Any => true,
            Self::Approved => review.approved,
            Self::Unapproved => !review.approved,
        }
    }
}

impl FromStr for ApprovalFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Ok(Self::Any),
            "approved" | "true" => Ok(Self::Approved),
            "unapproved" | "pending" | "false" => Ok(Self::Unapproved),
            _ => Err(format!(
                "Invalid status '{}'. Valid values: approved, unapproved, any",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    ProductId,
    Rating,
    Date,
    ReviewerName,
}

impl SortKey {
    /// Resolve a field name, accepting both the camelCase property names of
    /// the public schema and snake_case column names. Unknown names yield
    /// `None`, which leaves the input order untouched.
    pub fn from_field(field: &str) -> Option<Self> {
        match field.trim().to_lowercase().as_str() {
            "id" => Some(Self::Id),
            "productid" | "product_id" => Some(Self::ProductId),
            "rating" => Some(Self::Rating),
            "date" | "reviewdatetime" | "review_date_time" | "created_at" => Some(Self::Date),
            "reviewername" | "reviewer_name" => Some(Self::ReviewerName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Invalid sort direction '{}'. Valid values: asc, desc", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl OrderBy {
    /// Parse `field[:asc|:desc]`. `Ok(None)` means the field is not sortable.
    pub fn parse(spec: &str) -> Result<Option<Self>, String> {
        let mut parts = spec.splitn(2, ':');
        let field = parts.next().unwrap_or_default();
        let direction = match parts.next() {
            Some(dir) => SortDirection::from_str(dir)?,
            None => SortDirection::default(),
        };
        Ok(SortKey::from_field(field).map(|key| OrderBy { key, direction }))
    }
}

/// Engine-level filter, resolved once from the raw query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub search_term: Option<String>,
    pub order_by: Option<OrderBy>,
    pub status: ApprovalFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// Raw search arguments as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub search_term: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub from: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub to: Option<i64>,
    pub order_by: Option<String>,
    pub status: Option<String>,
}

/// Form submissions send `from=` for an unset bound.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl SearchParameters {
    pub fn into_filter(self) -> ReviewResult<(ReviewFilter, PageWindow)> {
        let status = match self.status.as_deref() {
            Some(s) => ApprovalFilter::from_str(s)
                .map_err(|msg| ReviewError::invalid_argument("status", msg))?,
            None => ApprovalFilter::Any,
        };
        let order_by = match self.order_by.as_deref() {
            Some(spec) if !spec.trim().is_empty() => OrderBy::parse(spec)
                .map_err(|msg| ReviewError::invalid_argument("orderBy", msg))?,
            _ => None,
        };
        let search_term = self
            .search_term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok((
            ReviewFilter {
                search_term,
                order_by,
                status,
            },
            PageWindow {
                from: self.from,
                to: self.to,
            },
        ))
    }
}

// ── Results ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Review>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub data: Vec<Review>,
    pub range: SearchRange,
}

// ── Settings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub allow_anonymous_reviews: bool,
    pub require_approval: bool,
    pub use_location: bool,
    pub default_open: bool,
    pub default_open_count: u32,
    pub default_stars_rating: u8,
    pub display_summary_if_none: bool,
    pub display_inline_if_none: bool,
    pub display_summary_total_reviews: bool,
    pub display_summary_add_button: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            allow_anonymous_reviews: false,
            require_approval: true,
            use_location: false,
            default_open: false,
            default_open_count: 0,
            default_stars_rating: 5,
            display_summary_if_none: false,
            display_inline_if_none: false,
            display_summary_total_reviews: true,
            display_summary_add_button: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_filter_from_str() {
        assert_eq!(ApprovalFilter::from_str("approved").unwrap(), ApprovalFilter::Approved);
        assert_eq!(ApprovalFilter::from_str("TRUE").unwrap(), ApprovalFilter::Approved);
        assert_eq!(ApprovalFilter::from_str("pending").unwrap(), ApprovalFilter::Unapproved);
        assert_eq!(ApprovalFilter::from_str("false").unwrap(), ApprovalFilter::Unapproved);
        assert_eq!(ApprovalFilter::from_str("").unwrap(), ApprovalFilter::Any);
        assert!(ApprovalFilter::from_str("maybe").is_err());
    }

    #[test]
    fn test_order_by_defaults_to_descending() {
        let order = OrderBy::parse("rating").unwrap().unwrap();
        assert_eq!(order.key, SortKey::Rating);
        assert_eq!(order.direction, SortDirection::Desc);
    }

    #[test]
    fn test_order_by_accepts_schema_names_and_direction() {
        let order = OrderBy::parse("ReviewDateTime:asc").unwrap().unwrap();
        assert_eq!(order.key, SortKey::Date);
        assert_eq!(order.direction, SortDirection::Asc);
    }

    #[test]
    fn test_order_by_unknown_field_is_none() {
        assert_eq!(OrderBy::parse("helpfulness").unwrap(), None);
    }

    #[test]
    fn test_order_by_rejects_bad_direction() {
        assert!(OrderBy::parse("rating:sideways").is_err());
    }

    #[test]
    fn test_search_parameters_into_filter() {
        let params = SearchParameters {
            search_term: Some("  great  ".into()),
            from: Some(0),
            to: Some(10),
            order_by: Some("rating:asc".into()),
            status: Some("approved".into()),
        };
        let (filter, window) = params.into_filter().unwrap();
        assert_eq!(filter.search_term.as_deref(), Some("great"));
        assert_eq!(filter.status, ApprovalFilter::Approved);
        assert_eq!(
            filter.order_by,
            Some(OrderBy {
                key: SortKey::Rating,
                direction: SortDirection::Asc
            })
        );
        assert_eq!(window, PageWindow { from: Some(0), to: Some(10) });
    }

    #[test]
    fn test_blank_search_term_is_dropped() {
        let params = SearchParameters {
            search_term: Some("   ".into()),
            ..Default::default()
        };
        let (filter, _) = params.into_filter().unwrap();
        assert!(filter.search_term.is_none());
    }

    #[test]
    fn test_app_settings_missing_fields_use_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"requireApproval": false}"#).unwrap();
        assert!(!settings.require_approval);
        assert_eq!(settings.default_stars_rating, 5);
    }
}
