//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity structs.
//! These helpers isolate the parsing and handle the dual datetime format
//! (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};
use vt_core::enums::EntityType;
use vt_core::errors::WorkflowError;

use crate::error::DatabaseError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2024-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2024-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a required ISO date column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is not `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// Parse an optional ISO date column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not `YYYY-MM-DD`.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_date(s)?)),
        _ => Ok(None),
    }
}

/// Storage form of a date column.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all vt-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a nullable INTEGER flag column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_bool(row: &libsql::Row, idx: i32) -> Result<Option<bool>, DatabaseError> {
    Ok(row.get::<Option<i64>>(idx)?.map(|v| v != 0))
}

/// Read a NOT NULL INTEGER flag column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// `Option<bool>` in its stored form.
#[must_use]
pub fn flag_value(flag: Option<bool>) -> libsql::Value {
    flag.map_or(libsql::Value::Null, |f| libsql::Value::Integer(i64::from(f)))
}

/// `Option<String>` in its stored form.
#[must_use]
pub fn text_value(text: Option<String>) -> libsql::Value {
    text.map_or(libsql::Value::Null, libsql::Value::Text)
}

/// Map `EntityType` to the corresponding SQL table name.
///
/// Exhaustive: adding an `EntityType` variant forces updating this.
#[must_use]
pub const fn entity_type_to_table(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Validator => "validators",
        EntityType::Movement => "movements",
        EntityType::Diagnostic => "diagnostics",
        EntityType::Review => "supervisor_reviews",
        EntityType::Preparation => "preparations",
    }
}

/// Whether a libSQL error is a UNIQUE constraint rejection.
///
/// libSQL surfaces constraint failures as SQLite error strings; the message
/// prefix is stable across versions.
#[must_use]
pub fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

/// Whether a libSQL error is a CHECK constraint rejection.
#[must_use]
pub fn is_check_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("CHECK constraint failed")
}

/// Translate a failed stage INSERT into the workflow error it stands for.
///
/// The UNIQUE(movement_id) constraint is the single authority on "one stage
/// record per movement": whoever loses the race gets `DuplicateStage`.
#[must_use]
pub fn map_stage_insert_error(e: libsql::Error, stage: EntityType, movement_id: &str) -> DatabaseError {
    if is_unique_violation(&e) {
        return WorkflowError::DuplicateStage {
            stage,
            movement_id: movement_id.to_string(),
        }
        .into();
    }
    if is_check_violation(&e) {
        return WorkflowError::StructuralInvariant(format!("{stage} row rejected: {e}")).into();
    }
    DatabaseError::LibSql(e)
}
