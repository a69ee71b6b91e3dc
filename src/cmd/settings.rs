//! App settings command — `reviews-ratings settings`.

use std::path::Path;

use anyhow::{Context, Result};

use reviews_ratings::reviews::db::DbHandle;
use reviews_ratings::reviews::store::SettingsStore;

use super::database::open_db;

pub async fn cmd_settings(db_path: &Path, require_approval: Option<bool>) -> Result<()> {
    let store = DbHandle::new(open_db(db_path)?);
    let mut settings = store
        .get_app_settings()
        .await
        .context("Failed to load app settings")?;

    if let Some(require_approval) = require_approval {
        settings.require_approval = require_approval;
        store
            .save_app_settings(&settings)
            .await
            .context("Failed to save app settings")?;
        tracing::info!(require_approval, "updated app settings");
    }

    let json = serde_json::to_string_pretty(&settings).context("Failed to render app settings")?;
    println!("{}", json);
    Ok(())
}
