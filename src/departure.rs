//! Converts raw departures into offsets from a shared reference instant.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::ParseError;
use crate::models::RawDeparture;

/// Format the API's date and time fields are combined into.
pub const DEPARTURE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Exact layout of [`DEPARTURE_FORMAT`]; `d` stands for one ASCII digit.
const DEPARTURE_SHAPE: &str = "dddd-dd-dd dd:dd";

/// chrono accepts unpadded fields and stray whitespace, so the layout is
/// checked byte for byte before parsing.
fn has_departure_shape(input: &str) -> bool {
    input.len() == DEPARTURE_SHAPE.len()
        && input
            .bytes()
            .zip(DEPARTURE_SHAPE.bytes())
            .all(|(c, want)| match want {
                b'd' => c.is_ascii_digit(),
                _ => c == want,
            })
}

/// Returns how far `departure` is from `now`; negative if it has already left.
///
/// A missing or empty `expected_departure_date` is taken to be the date of
/// `now`. Both values are local wall-clock times. The combined string must be
/// exactly `YYYY-MM-DD HH:MM`, zero-padded, with nothing before or after.
pub fn offset_from_departure(
    departure: &RawDeparture,
    now: NaiveDateTime,
) -> Result<TimeDelta, ParseError> {
    let date = match departure.expected_departure_date.as_deref() {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => now.format("%Y-%m-%d").to_string(),
    };

    let input = format!("{} {}", date, departure.best_departure_estimate);
    if !has_departure_shape(&input) {
        return Err(ParseError::Shape { input });
    }

    let departs_at = NaiveDateTime::parse_from_str(&input, DEPARTURE_FORMAT)
        .map_err(|source| ParseError::Invalid { input, source })?;

    Ok(departs_at - now)
}
