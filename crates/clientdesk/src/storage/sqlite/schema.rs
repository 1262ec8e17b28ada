//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
///
/// The `UNIQUE` constraints on `email` and `phone` are the final guard
/// against concurrent writers passing the service-level check.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

pub const INSERT_CLIENT: &str = r#"
INSERT INTO clients (id, name, email, phone, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const UPDATE_CLIENT: &str = r#"
UPDATE clients
SET name = ?2, email = ?3, phone = ?4, updated_at = ?5
WHERE id = ?1
"#;

pub const DELETE_CLIENT: &str = r#"
DELETE FROM clients WHERE id = ?1
"#;

pub const SELECT_CLIENT_BY_ID: &str = r#"
SELECT id, name, email, phone, created_at, updated_at
FROM clients
WHERE id = ?1
"#;

pub const SELECT_CLIENT_BY_EMAIL: &str = r#"
SELECT id, name, email, phone, created_at, updated_at
FROM clients
WHERE email = ?1
"#;

pub const SELECT_CLIENT_BY_PHONE: &str = r#"
SELECT id, name, email, phone, created_at, updated_at
FROM clients
WHERE phone = ?1
"#;

/// Insertion order via the implicit rowid.
pub const SELECT_CLIENTS_PAGE: &str = r#"
SELECT id, name, email, phone, created_at, updated_at
FROM clients
ORDER BY rowid
LIMIT ?1 OFFSET ?2
"#;

pub const COUNT_CLIENTS: &str = r#"
SELECT COUNT(*) FROM clients
"#;
