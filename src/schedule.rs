//! Per-stop departure boards: grouping by route and ordering by imminence.

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::HashMap;
use tracing::debug;

use crate::departure::offset_from_departure;
use crate::error::QueryError;
use crate::models::{LiveResponse, StopCode};
use crate::services::live_departures::LiveDepartures;

/// All upcoming departures for one line and direction at a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    /// `"<line> to <direction>"`
    pub route: String,
    /// Soonest first.
    pub offsets: Vec<TimeDelta>,
}

/// A stop's display name and its routes, soonest route first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopSchedule {
    pub name: String,
    pub routes: Vec<RouteGroup>,
}

/// Fetches live departures for `stop` and arranges them into a [`StopSchedule`].
pub async fn query_stop<A>(
    api: &A,
    stop: &StopCode,
    now: NaiveDateTime,
) -> Result<StopSchedule, QueryError>
where
    A: LiveDepartures + ?Sized,
{
    let response = api.live_departures(stop).await?;
    let schedule = build_schedule(response, now)?;
    debug!(%stop, routes = schedule.routes.len(), "Stop schedule built");
    Ok(schedule)
}

/// Groups a decoded response by route and sorts it.
///
/// Offsets within a route are ascending. Routes are ordered by comparing
/// their offset lists lexicographically, so the route with the soonest bus
/// comes first and ties fall through to the next-soonest. Routes with equal
/// lists are ordered by name.
pub fn build_schedule(
    response: LiveResponse,
    now: NaiveDateTime,
) -> Result<StopSchedule, QueryError> {
    if let Some(message) = response.error {
        return Err(QueryError::Remote(message));
    }

    let departures = response
        .departures
        .ok_or_else(|| QueryError::MalformedResponse("missing \"departures\"".to_string()))?;
    let name = response
        .name
        .ok_or_else(|| QueryError::MalformedResponse("missing \"name\"".to_string()))?;

    let mut by_route: HashMap<String, Vec<TimeDelta>> = HashMap::new();
    for departure in departures.values().flatten() {
        let offset = offset_from_departure(departure, now)?;
        by_route
            .entry(departure.route_key())
            .or_default()
            .push(offset);
    }

    let mut routes: Vec<RouteGroup> = by_route
        .into_iter()
        .map(|(route, mut offsets)| {
            offsets.sort();
            RouteGroup { route, offsets }
        })
        .collect();

    routes.sort_by(|a, b| {
        a.offsets
            .cmp(&b.offsets)
            .then_with(|| a.route.cmp(&b.route))
    });

    Ok(StopSchedule { name, routes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawDeparture;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn dep(line: &str, direction: &str, time: &str) -> RawDeparture {
        RawDeparture {
            line: line.to_string(),
            direction: direction.to_string(),
            expected_departure_date: Some("2024-01-01".to_string()),
            best_departure_estimate: time.to_string(),
        }
    }

    fn response(groups: Vec<(&str, Vec<RawDeparture>)>) -> LiveResponse {
        LiveResponse {
            name: Some("Hackney Central".to_string()),
            departures: Some(
                groups
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect::<BTreeMap<_, _>>(),
            ),
            error: None,
        }
    }

    fn mins(m: i64) -> TimeDelta {
        TimeDelta::minutes(m)
    }

    #[test]
    fn test_offsets_sorted_within_route() {
        let resp = response(vec![(
            "all",
            vec![dep("10", "Town", "08:05"), dep("10", "Town", "08:02")],
        )]);

        let schedule = build_schedule(resp, now()).unwrap();
        assert_eq!(schedule.name, "Hackney Central");
        assert_eq!(
            schedule.routes,
            vec![RouteGroup {
                route: "10 to Town".to_string(),
                offsets: vec![mins(2), mins(5)],
            }]
        );
    }

    #[test]
    fn test_routes_ordered_by_soonest_departure() {
        let resp = response(vec![(
            "all",
            vec![dep("B", "Beach", "08:02"), dep("A", "Abbey", "08:01")],
        )]);

        let schedule = build_schedule(resp, now()).unwrap();
        let order: Vec<_> = schedule.routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(order, vec!["A to Abbey", "B to Beach"]);
    }

    #[test]
    fn test_route_ties_use_following_departures() {
        let resp = response(vec![(
            "all",
            vec![
                dep("1", "North", "08:03"),
                dep("1", "North", "08:20"),
                dep("2", "South", "08:03"),
                dep("2", "South", "08:10"),
                dep("3", "East", "08:03"),
            ],
        )]);

        let schedule = build_schedule(resp, now()).unwrap();
        let order: Vec<_> = schedule.routes.iter().map(|r| r.route.as_str()).collect();
        // [3] is a prefix of both others, then [3, 10] < [3, 20].
        assert_eq!(order, vec!["3 to East", "2 to South", "1 to North"]);
    }

    #[test]
    fn test_sub_collections_are_merged() {
        let resp = response(vec![
            ("TFL", vec![dep("38", "Victoria", "08:15")]),
            ("ARRIVA", vec![dep("38", "Victoria", "08:07")]),
        ]);

        let schedule = build_schedule(resp, now()).unwrap();
        assert_eq!(schedule.routes.len(), 1);
        assert_eq!(schedule.routes[0].offsets, vec![mins(7), mins(15)]);
    }

    #[test]
    fn test_direction_splits_routes() {
        let resp = response(vec![(
            "all",
            vec![dep("38", "Victoria", "08:15"), dep("38", "Clapton", "08:07")],
        )]);

        let schedule = build_schedule(resp, now()).unwrap();
        assert_eq!(schedule.routes.len(), 2);
        assert_eq!(schedule.routes[0].route, "38 to Clapton");
    }

    #[test]
    fn test_empty_departures_give_empty_schedule() {
        let schedule = build_schedule(response(vec![]), now()).unwrap();
        assert!(schedule.routes.is_empty());
    }

    #[test]
    fn test_remote_error_is_reported() {
        let resp = LiveResponse {
            error: Some("Invalid ATCO code".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_schedule(resp, now()),
            Err(QueryError::Remote("Invalid ATCO code".to_string()))
        );
    }

    #[test]
    fn test_null_error_field_rejects_stop() {
        let resp: LiveResponse = serde_json::from_str(
            r#"{"name": "Somewhere", "departures": {"all": []}, "error": null}"#,
        )
        .unwrap();
        assert_eq!(
            build_schedule(resp, now()),
            Err(QueryError::Remote("null".to_string()))
        );
    }

    #[test]
    fn test_missing_departures_is_malformed() {
        let resp = LiveResponse {
            name: Some("Somewhere".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_schedule(resp, now()),
            Err(QueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let mut resp = response(vec![]);
        resp.name = None;
        assert!(matches!(
            build_schedule(resp, now()),
            Err(QueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_bad_time_fails_whole_stop() {
        let resp = response(vec![(
            "all",
            vec![dep("10", "Town", "08:05"), dep("10", "Town", "8.05pm")],
        )]);
        assert!(matches!(
            build_schedule(resp, now()),
            Err(QueryError::Parse(_))
        ));
    }

    struct FixedApi(LiveResponse);

    #[async_trait]
    impl LiveDepartures for FixedApi {
        async fn live_departures(&self, _stop: &StopCode) -> Result<LiveResponse, QueryError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_query_stop_is_deterministic() {
        let api = FixedApi(response(vec![
            (
                "all",
                vec![
                    dep("1", "North", "08:30"),
                    dep("2", "South", "08:10"),
                    dep("1", "North", "08:04"),
                    dep("3", "East", "08:10"),
                ],
            ),
            ("night", vec![dep("N1", "Depot", "08:45")]),
        ]));
        let stop = StopCode::from("490004733D");

        let first = query_stop(&api, &stop, now()).await.unwrap();
        let second = query_stop(&api, &stop, now()).await.unwrap();
        assert_eq!(first, second);
    }
}
