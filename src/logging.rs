//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

/// Install the global subscriber. `RUST_LOG` wins over the configured level;
/// `verbose` forces `debug` for this crate.
pub fn init_tracing(settings: &LoggingSettings, verbose: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(settings, verbose)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match settings.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
    Ok(())
}

/// Filter built from `logging.level`, which is either a bare level or a full
/// directive list such as `info,hyper=warn`.
fn default_filter(settings: &LoggingSettings, verbose: bool) -> Result<EnvFilter> {
    let level = settings.level.trim();
    if !level.contains(['=', ',']) {
        level.parse::<LevelFilter>().with_context(|| {
            format!(
                "Invalid log level '{}'. Valid values: trace, debug, info, warn, error, off",
                level
            )
        })?;
    }

    let directive = if verbose {
        format!("{},reviews_ratings=debug,reviews=debug", level)
    } else {
        format!("{},tower_http=info", level)
    };
    EnvFilter::try_new(&directive).with_context(|| format!("Invalid log filter '{}'", level))
}
