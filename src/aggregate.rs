//! Concurrent fan-out of stop queries with a bounded wait for results.
//!
//! One task is spawned per requested stop. Tasks report over a single mpsc
//! channel and never share anything else; they all read the same reference
//! instant, so offsets from different stops are comparable. The caller waits
//! on the channel with a timeout per receive, and when it gives up (or has
//! everything) a watch signal tells the remaining tasks to drop their
//! in-flight requests.

use chrono::{Local, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info_span, instrument, warn};

use crate::error::{AggregateError, QueryError};
use crate::models::StopCode;
use crate::schedule::{StopSchedule, query_stop};
use crate::services::live_departures::LiveDepartures;

/// Why a requested stop has no schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReason {
    /// The query finished but failed.
    Failed(QueryError),
    /// No answer arrived before the aggregator stopped waiting.
    TimedOut,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "{e}"),
            Self::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Schedules for the stops that answered in time, plus the reason every
/// other requested stop is absent.
#[derive(Debug, Default)]
pub struct AggregateResult {
    pub schedules: HashMap<StopCode, StopSchedule>,
    pub missing: BTreeMap<StopCode, MissingReason>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Schedules in the order their stops were requested, skipping missing
    /// stops and repeated codes.
    pub fn in_request_order<'a>(
        &'a self,
        requested: &'a [StopCode],
    ) -> impl Iterator<Item = (&'a StopCode, &'a StopSchedule)> + 'a {
        let mut seen = HashSet::new();
        requested
            .iter()
            .filter(move |stop| seen.insert(*stop))
            .filter_map(move |stop| self.schedules.get(stop).map(|schedule| (stop, schedule)))
    }
}

type Outcome = (StopCode, Result<StopSchedule, QueryError>);

/// Comma-separated codes of the missing stops, or `None` if nothing is missing.
fn missing_stop_list(missing: &BTreeMap<StopCode, MissingReason>) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let names: Vec<&str> = missing.keys().map(StopCode::as_str).collect();
    Some(names.join(", "))
}

/// Queries every stop concurrently using the current local time as "now".
///
/// See [`query_stops_at`].
pub async fn query_stops<A>(
    api: Arc<A>,
    stops: &[StopCode],
    timeout: Duration,
) -> Result<AggregateResult, AggregateError>
where
    A: LiveDepartures + ?Sized + 'static,
{
    query_stops_at(api, stops, timeout, Local::now().naive_local()).await
}

/// Queries every stop concurrently, measuring departures from `now`.
///
/// `timeout` bounds each wait for the next result, not the whole run. The
/// first wait that elapses with nothing received ends collection; every stop
/// without a result by then is [`MissingReason::TimedOut`]. Failed queries
/// are recorded as [`MissingReason::Failed`] and never fail the run.
///
/// Returns [`AggregateError::NoStops`] if `stops` is empty. Duplicate codes
/// are each queried; the last successful answer wins.
#[instrument(
    skip(api, stops, timeout, now),
    fields(stop_count = stops.len(), timeout_secs = timeout.as_secs_f64())
)]
pub async fn query_stops_at<A>(
    api: Arc<A>,
    stops: &[StopCode],
    timeout: Duration,
    now: NaiveDateTime,
) -> Result<AggregateResult, AggregateError>
where
    A: LiveDepartures + ?Sized + 'static,
{
    if stops.is_empty() {
        return Err(AggregateError::NoStops);
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    for stop in stops {
        let api = Arc::clone(&api);
        let tx = tx.clone();
        let mut shutdown = shutdown_rx.clone();
        let stop = stop.clone();
        let span = info_span!("stop_query", %stop);

        tokio::spawn(
            async move {
                tokio::select! {
                    outcome = query_stop(&*api, &stop, now) => {
                        // The receiver is gone once the aggregator stops waiting.
                        let _ = tx.send((stop, outcome));
                    }
                    _ = shutdown.changed() => {
                        debug!("Stop query cancelled");
                    }
                }
            }
            .instrument(span),
        );
    }
    drop(tx);

    let mut result = AggregateResult::default();
    let mut pending = stops.len();

    while pending > 0 {
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some((stop, outcome))) => {
                pending -= 1;
                match outcome {
                    Ok(schedule) => {
                        debug!(%stop, routes = schedule.routes.len(), "Stop answered");
                        result.missing.remove(&stop);
                        result.schedules.insert(stop, schedule);
                    }
                    Err(error) => {
                        debug!(%stop, %error, "Stop query failed");
                        if !result.schedules.contains_key(&stop) {
                            result.missing.insert(stop, MissingReason::Failed(error));
                        }
                    }
                }
            }
            // Every task has finished or died; nothing more can arrive.
            Ok(None) => break,
            Err(_) => {
                debug!(pending, "Timed out waiting for stop results");
                break;
            }
        }
    }

    for stop in stops {
        if !result.schedules.contains_key(stop) {
            result
                .missing
                .entry(stop.clone())
                .or_insert(MissingReason::TimedOut);
        }
    }

    if let Some(stops) = missing_stop_list(&result.missing) {
        warn!(%stops, "No results for stops");
    }

    // Tasks that already finished ignore this.
    let _ = shutdown_tx.send(true);

    Ok(result)
}
