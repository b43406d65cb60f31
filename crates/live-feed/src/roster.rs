//! Device Roster Snapshot Loader

use alert_feed::{AlertFeed, AlertSound, MapSurface};
use alert_model::Device;
use thiserror::Error;
use tracing::{error, info};

/// Roster loader error types
#[derive(Debug, Error)]
pub enum RosterError {
    /// Network failure or non-success response
    #[error("Roster request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Fetch the device roster once. A non-2xx response counts as failure.
/// No retry, no explicit timeout beyond the client's defaults.
pub async fn fetch_devices(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Device>, RosterError> {
    let devices = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Device>>()
        .await?;

    info!(count = devices.len(), url, "Device roster fetched");
    Ok(devices)
}

/// Load the roster snapshot into the feed, tolerating failure: a failed
/// fetch is logged and the dashboard stays usable with zero device markers.
pub async fn load_into<S, A>(client: &reqwest::Client, url: &str, feed: &mut AlertFeed<S, A>)
where
    S: MapSurface,
    A: AlertSound,
{
    match fetch_devices(client, url).await {
        Ok(devices) => feed.load_devices(devices),
        Err(err) => error!(%err, url, "Device roster load failed, continuing without markers"),
    }
}
