use chrono::{DateTime, SecondsFormat, Utc};

/// Render epoch milliseconds as an RFC 3339 UTC string for API responses.
pub fn iso_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_millis_renders_utc_rfc3339() {
        assert_eq!(iso_millis(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso_millis(1_700_000_000_000), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn iso_millis_out_of_range_is_empty() {
        assert_eq!(iso_millis(i64::MAX), "");
    }
}
