use lastcall_core::{AppConfig, GeoPosition};
use lastcall_discovery::{DiscoveryClient, DISCOVERY_FAILED_MESSAGE};
use lastcall_session::sort_for_display;

use crate::render::render_outlets;

/// One discovery for a fixed position, printed in display order.
///
/// # Errors
///
/// Returns an error if the coordinates are invalid, the client cannot be
/// built, or discovery fails.
pub(crate) async fn run_find(
    config: &AppConfig,
    lat: f64,
    lng: f64,
    json: bool,
) -> anyhow::Result<()> {
    let position = GeoPosition::new(lat, lng)?;
    let client = DiscoveryClient::new(config)?;

    let outlets = client
        .fetch_nearby_outlets(position)
        .await
        .map_err(|_| anyhow::anyhow!(DISCOVERY_FAILED_MESSAGE))?;
    let sorted = sort_for_display(&outlets);

    if json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else {
        print!("{}", render_outlets(&sorted));
    }
    Ok(())
}
