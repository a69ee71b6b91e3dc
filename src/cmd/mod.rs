//! CLI command implementations.
//!
//! | Module     | Commands handled    |
//! |------------|---------------------|
//! | `serve`    | `Serve`             |
//! | `database` | `Init`, `Import`    |
//! | `settings` | `Settings`          |

pub mod database;
pub mod serve;
pub mod settings;

pub use database::{cmd_import, cmd_init};
pub use serve::cmd_serve;
pub use settings::cmd_settings;
