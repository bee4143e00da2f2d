//! Trait for sources of live stop departures.

use async_trait::async_trait;

use crate::error::QueryError;
use crate::models::{LiveResponse, StopCode};

/// Abstraction over a live departures provider (e.g., TransportAPI).
///
/// One call is one network round trip; implementations do not retry.
#[async_trait]
pub trait LiveDepartures: Send + Sync {
    /// Returns the decoded live departures payload for `stop`.
    async fn live_departures(&self, stop: &StopCode) -> Result<LiveResponse, QueryError>;
}
