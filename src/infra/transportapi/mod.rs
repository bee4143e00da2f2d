//! [TransportAPI](https://www.transportapi.com) v3 live bus departures.

mod client;

pub use client::TransportApiClient;
