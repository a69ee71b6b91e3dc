//! HTTP server command — `reviews-ratings serve`.

use anyhow::Result;

use reviews_ratings::config::ServerSettings;

pub async fn cmd_serve(settings: &ServerSettings) -> Result<()> {
    reviews_ratings::reviews::server::start_server(settings).await
}
