//! Live UK bus departures for one or more stops.
//!
//! [`aggregate::query_stops`] queries every stop concurrently through a
//! [`services::live_departures::LiveDepartures`] source, groups each stop's
//! departures by route, and returns whatever arrived within the timeout.

pub mod aggregate;
pub mod config;
pub mod departure;
pub mod error;
pub mod fetch;
pub mod humanize;
pub mod infra;
pub mod models;
pub mod output;
pub mod schedule;
pub mod services;
