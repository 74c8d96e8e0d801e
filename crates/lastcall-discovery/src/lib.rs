//! Store discovery for Last Call.
//!
//! Sends a map-grounded prompt to Gemini, then rebuilds outlet records from
//! the free-form answer with a heuristic parser. Grounding metadata is
//! decoded but never used to attribute links to outlets.

pub mod client;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod types;

mod retry;

use std::future::Future;

use lastcall_core::{GeoPosition, Outlet};

pub use client::DiscoveryClient;
pub use error::{DiscoveryError, DISCOVERY_FAILED_MESSAGE};
pub use parser::{build_map_url, strip_markdown, ResponseParser};
pub use types::{DiscoveryAnswer, GroundingPlace};

/// Anything that can produce an outlet batch for a position.
///
/// Implemented by [`DiscoveryClient`]; the session layer is generic over it
/// so tests can substitute canned batches.
pub trait OutletSource: Send + Sync + 'static {
    fn fetch_nearby_outlets(
        &self,
        position: GeoPosition,
    ) -> impl Future<Output = Result<Vec<Outlet>, DiscoveryError>> + Send;
}

impl OutletSource for DiscoveryClient {
    fn fetch_nearby_outlets(
        &self,
        position: GeoPosition,
    ) -> impl Future<Output = Result<Vec<Outlet>, DiscoveryError>> + Send {
        DiscoveryClient::fetch_nearby_outlets(self, position)
    }
}
