//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{OccupancyStatus, PlanTier, SubscriptionStatus};

/// Storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_error<E>(col: usize, e: E) -> SqlError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SqlError::FromSqlConversionFailure(col, Type::Text, Box::new(e))
}

fn invalid_text(col: usize, what: &str, value: &str) -> SqlError {
    SqlError::FromSqlConversionFailure(
        col,
        Type::Text,
        format!("invalid {}: {:?}", what, value).into(),
    )
}

/// Parse a UUID from a database string column
pub fn parse_uuid(s: &str) -> Result<Uuid, SqlError> {
    Uuid::parse_str(s).map_err(|e| conversion_error(0, e))
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(0, e))
}

/// Parse an optional DateTime from an RFC3339 string
pub fn parse_datetime_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>, SqlError> {
    s.map(|s| parse_datetime(&s)).transpose()
}

/// Parse a calendar date stored as YYYY-MM-DD
pub fn parse_date(s: &str) -> Result<NaiveDate, SqlError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(0, e))
}

/// Parse an optional calendar date
pub fn parse_date_opt(s: Option<String>) -> Result<Option<NaiveDate>, SqlError> {
    s.map(|s| parse_date(&s)).transpose()
}

/// Format a calendar date for storage
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a money amount stored as decimal text
pub fn parse_decimal(s: &str) -> Result<Decimal, SqlError> {
    Decimal::from_str(s).map_err(|e| conversion_error(0, e))
}

pub fn parse_occupancy(s: &str) -> Result<OccupancyStatus, SqlError> {
    OccupancyStatus::parse(s).ok_or_else(|| invalid_text(0, "occupancy status", s))
}

pub fn parse_plan(s: &str) -> Result<PlanTier, SqlError> {
    PlanTier::parse(s).ok_or_else(|| invalid_text(0, "plan tier", s))
}

pub fn parse_subscription_status(s: &str) -> Result<SubscriptionStatus, SqlError> {
    SubscriptionStatus::parse(s).ok_or_else(|| invalid_text(0, "subscription status", s))
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(format_date(date), "2024-01-15");
        assert!(parse_date("15/01/2024").is_err());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1250.50").unwrap(), Decimal::new(125050, 2));
        assert!(parse_decimal("twelve").is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(parse_occupancy("vacant").unwrap(), OccupancyStatus::Vacant);
        assert!(parse_occupancy("empty").is_err());
        assert_eq!(parse_plan("basic").unwrap(), PlanTier::Basic);
        assert!(parse_subscription_status("paused").is_err());
    }

    #[test]
    fn test_optional_ext() {
        let missing: Result<u32, SqlError> = Err(SqlError::QueryReturnedNoRows);
        assert_eq!(missing.optional().unwrap(), None);
        let found: Result<u32, SqlError> = Ok(7);
        assert_eq!(found.optional().unwrap(), Some(7));
    }
}
