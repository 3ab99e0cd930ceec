// src/utils/mod.rs

pub mod hash;
pub mod html;
pub mod jwt;
pub mod oauth;
pub mod pathway;

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp the way every TEXT time column stores it
/// (`YYYY-MM-DDTHH:MM:SSZ`), so string comparison in SQL orders correctly.
pub fn sql_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_match_column_default_format() {
        let at = DateTime::parse_from_rfc3339("2025-03-04T05:06:07.891+02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(sql_timestamp(at), "2025-03-04T03:06:07Z");
    }
}
