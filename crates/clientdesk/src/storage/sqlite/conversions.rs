//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use clientdesk_core::client::Client;

/// Convert a SQLite row to a Client.
///
/// Expected columns: id, name, email, phone, created_at, updated_at
pub fn row_to_client(row: &Row) -> rusqlite::Result<Client> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let phone: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Client {
        id: parse_uuid(0, &id)?,
        name,
        email,
        phone,
        created_at: parse_datetime(4, &created_at)?,
        updated_at: parse_datetime(5, &updated_at)?,
    })
}

fn parse_uuid(column: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// Format a DateTime for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
