//! Clock and date-display helpers.

#[cfg(test)]
#[path = "time_test.rs"]
mod time_test;

/// Current time in whole seconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
pub fn now_secs() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        (js_sys::Date::now() / 1000.0) as i64
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64)
    }
}

/// Date portion (`YYYY-MM-DD`) of an ISO 8601 timestamp, or `fallback`.
pub fn display_date(timestamp: Option<&str>, fallback: &str) -> String {
    timestamp
        .map(str::trim)
        .filter(|ts| ts.len() >= 10 && ts.is_char_boundary(10))
        .map_or_else(|| fallback.to_owned(), |ts| ts[..10].to_owned())
}
