pub mod live_departures;
