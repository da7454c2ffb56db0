pub mod valuation;

use chrono::{DateTime, Utc};
use reit_dcf_core::{parse_instant, ReitDcfError};

/// Parse a comma-separated list of numbers such as `-0.01,0,0.01`.
pub fn parse_number_list(field: &str, raw: &str) -> Result<Vec<f64>, ReitDcfError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|e| ReitDcfError::InvalidInput {
                field: field.to_string(),
                reason: format!("'{s}' is not a number: {e}"),
            })
        })
        .collect()
}

/// Resolve an optional `--as-of` flag; absent means the system clock.
pub fn parse_as_of(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ReitDcfError> {
    raw.map(parse_instant).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_number_list() {
        let values = parse_number_list("range", "-0.01, 0,0.01,").unwrap();
        assert_eq!(values, vec![-0.01, 0.0, 0.01]);
    }

    #[test]
    fn test_parse_number_list_rejects_words() {
        let err = parse_number_list("range", "0.01,abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_parse_as_of() {
        assert_eq!(parse_as_of(None).unwrap(), None);
        assert_eq!(
            parse_as_of(Some("2026-10-19")).unwrap(),
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap())
        );
        assert!(parse_as_of(Some("19/10/2026")).is_err());
    }
}
