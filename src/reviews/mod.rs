//! Reviews & ratings query service.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, TraceLayer)            │
//! │          │ <─────── │    └─ api.rs  (handlers, SearchParameters)       │
//! └──────────┘          │         │                                        │
//!                       │         │ QueryService::reviews_by_product_id()  │
//!                       │         v                                        │
//!                       │  query.rs  (resolvers, QueryObserver hook)       │
//!                       │         │                     │                  │
//!                       │         │ ReviewStore         │ filter/paginate  │
//!                       │         v                     v                  │
//!                       │  store.rs ── db.rs      engine.rs, aggregate.rs  │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! | Module      | Responsibility                                          |
//! |-------------|---------------------------------------------------------|
//! | `models`    | `Review`, `AppSettings`, typed filter and sort enums    |
//! | `engine`    | Search-term/status filtering, stable ordering, windows  |
//! | `aggregate` | Average rating and approved-review counts               |
//! | `store`     | `ReviewStore` / `SettingsStore` traits                  |
//! | `db`        | SQLite access via `DbHandle` (thin `Arc<Mutex<_>>`)     |
//! | `observer`  | `QueryObserver` trait, tracing-backed default           |
//! | `query`     | `QueryService` resolvers for every query field          |
//!
//! ## Typical Request Flow (`GET /api/products/p1/reviews?from=0&to=10`)
//!
//! 1. `api::list_reviews_by_product()` parses the query string into a
//!    `ReviewFilter` and a `PageWindow`; bad `status`/`orderBy` values are
//!    rejected with 400 here and never reach the engine.
//! 2. `QueryService` fetches the product's reviews from the `ReviewStore`.
//! 3. `engine::filter_reviews()` applies the search term, status and order;
//!    the filtered length becomes `range.total`.
//! 4. `engine::paginate()` cuts the `[from, to)` window and the observer is
//!    told how many reviews were fetched, kept and returned.

pub mod aggregate;
pub mod api;
pub mod db;
pub mod engine;
pub mod models;
pub mod observer;
pub mod query;
pub mod server;
pub mod store;
