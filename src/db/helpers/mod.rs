use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// `last_studied` is stored as epoch milliseconds; negative values only come
/// from corrupted rows and are treated as "never studied".
pub fn normalize_last_studied(value: Option<i64>) -> i64 {
    value.unwrap_or(0).max(0)
}

pub fn expect_one_row(rows_affected: usize, what: &str, id: i64) -> Result<()> {
    match rows_affected {
        1 => Ok(()),
        0 => Err(anyhow!("{what} {id} not found")),
        n => Err(anyhow!("{what} {id} matched {n} rows")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_studied_defaults_to_never() {
        assert_eq!(normalize_last_studied(None), 0);
        assert_eq!(normalize_last_studied(Some(-5)), 0);
        assert_eq!(normalize_last_studied(Some(1_700_000_000_000)), 1_700_000_000_000);
    }

    #[test]
    fn parse_datetime_reports_field() {
        let err = parse_datetime("yesterday", "created_at").unwrap_err();
        assert!(err.to_string().contains("created_at"));
        assert!(parse_datetime("2024-05-01T10:00:00+00:00", "created_at").is_ok());
    }
}
