//! SQLite repository implementation.
//!
//! Implements `ClientRepository` from `clientdesk_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use clientdesk_core::client::Client;
use clientdesk_core::storage::{
    page_offset, ClientRepository, PaginatedResult, RepositoryError, Result,
};

use super::conversions::{format_datetime, row_to_client};
use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository implementation.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Runs a single-row lookup keyed by one text parameter.
    async fn find_one(&self, sql: &'static str, key: String) -> Result<Option<Client>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                match stmt.query_row([&key], row_to_client) {
                    Ok(client) => Ok(Some(client)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn count(&self) -> Result<usize> {
        self.conn
            .call(|conn| {
                let total: i64 = conn
                    .query_row(schema::COUNT_CLIENTS, [], |row| row.get(0))
                    .map_err(wrap_err)?;
                Ok(total)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
            .and_then(|total| {
                usize::try_from(total).map_err(|e| RepositoryError::InvalidData(e.to_string()))
            })
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<Client>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_CLIENTS_PAGE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([limit, offset], row_to_client)
                    .map_err(wrap_err)?;

                let mut clients = Vec::new();
                for row_result in rows {
                    clients.push(row_result.map_err(wrap_err)?);
                }
                Ok(clients)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }
}

#[async_trait]
impl ClientRepository for SqliteRepository {
    async fn save(&self, client: &Client) -> Result<Client> {
        let id = client.id.to_string();
        let name = client.name.clone();
        let email = client.email.clone();
        let phone = client.phone.clone();
        let created_at = format_datetime(&client.created_at);
        let updated_at = format_datetime(&client.updated_at);

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_CLIENT,
                    [&id, &name, &email, &phone, &created_at, &updated_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)?;

        Ok(client.clone())
    }

    async fn update(&self, id: Uuid, client: &Client) -> Result<Option<Client>> {
        let id_str = id.to_string();
        let name = client.name.clone();
        let email = client.email.clone();
        let phone = client.phone.clone();
        let updated_at = format_datetime(&client.updated_at);

        let rows_affected = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::UPDATE_CLIENT,
                    [&id_str, &name, &email, &phone, &updated_at],
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)?;

        if rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_CLIENT, [&id_str])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>> {
        self.find_one(schema::SELECT_CLIENT_BY_ID, id.to_string())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        self.find_one(schema::SELECT_CLIENT_BY_EMAIL, email.to_string())
            .await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        self.find_one(schema::SELECT_CLIENT_BY_PHONE, phone.to_string())
            .await
    }

    async fn find_paginated(&self, page: usize, limit: usize) -> Result<PaginatedResult<Client>> {
        let (total, data) =
            tokio::try_join!(self.count(), self.page(page_offset(page, limit), limit))?;
        Ok(PaginatedResult::new(page, limit, total, data))
    }
}
