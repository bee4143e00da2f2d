//! Output formatting for aggregated stop schedules.
//!
//! Supports the plain console layout and a JSON document for dashboards.

use anyhow::Result;
use serde::Serialize;

use crate::aggregate::AggregateResult;
use crate::humanize::human_duration;
use crate::models::StopCode;
use crate::schedule::StopSchedule;

#[derive(Serialize)]
struct StopView<'a> {
    stop: &'a StopCode,
    name: &'a str,
    routes: Vec<RouteView<'a>>,
}

#[derive(Serialize)]
struct RouteView<'a> {
    route: &'a str,
    departures: Vec<DepartureView>,
}

#[derive(Serialize)]
struct DepartureView {
    seconds: i64,
    display: String,
}

/// Formats one stop as a heading followed by a `- route: times` line per route.
pub fn format_stop(stop: &StopCode, schedule: &StopSchedule) -> String {
    let mut out = format!("{} ({}):\n", schedule.name, stop);
    for group in &schedule.routes {
        let times: Vec<String> = group.offsets.iter().map(|o| human_duration(*o)).collect();
        out.push_str(&format!("- {}: {}\n", group.route, times.join(", ")));
    }
    out
}

/// Renders every answered stop, in request order, separated by blank lines.
pub fn render_text(result: &AggregateResult, requested: &[StopCode]) -> String {
    result
        .in_request_order(requested)
        .map(|(stop, schedule)| format_stop(stop, schedule))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders every answered stop, in request order, as a pretty JSON array.
pub fn render_json(result: &AggregateResult, requested: &[StopCode]) -> Result<String> {
    let stops: Vec<StopView> = result
        .in_request_order(requested)
        .map(|(stop, schedule)| StopView {
            stop,
            name: &schedule.name,
            routes: schedule
                .routes
                .iter()
                .map(|group| RouteView {
                    route: &group.route,
                    departures: group
                        .offsets
                        .iter()
                        .map(|o| DepartureView {
                            seconds: o.num_seconds(),
                            display: human_duration(*o),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&stops)?)
}
