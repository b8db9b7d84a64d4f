//! Table-scoped access to the post store.
//!
//! [`TableClient`] is the capability set the repository layer needs and nothing
//! more: eq-filtered selects with ordering, single-row reads, and
//! row-returning writes. [`supabase::SupabaseClient`] implements it over
//! PostgREST; [`memory::MemoryClient`] implements the same observable
//! semantics in process for tests.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The store reported an error; carries its human-readable message.
    #[error("{0}")]
    Backend(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Eq-filter plus ordering for a select, built up fluently:
/// `SelectQuery::new().eq("id", id)` or
/// `SelectQuery::new().order("created_at", false)`.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    /// Columns to project; `None` means `*`.
    pub columns: Option<String>,
    /// Conjunction of `column = value` filters.
    pub filters: Vec<(String, String)>,
    /// `(column, ascending)`.
    pub order: Option<(String, bool)>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some((column.into(), ascending));
        self
    }
}

/// Terminal operations against one table of the store.
///
/// Rows cross this boundary as `serde_json::Value`; the repository layer owns
/// the typed view. One implementation per backend.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Fetch every row matching the query.
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>, ClientError>;

    /// Fetch exactly one row. Zero or more than one match is a backend error.
    async fn select_single(&self, table: &str, query: SelectQuery) -> Result<Value, ClientError>;

    /// Insert one row and return it in full as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, ClientError>;

    /// Apply a partial patch to the row matching the eq filters and return the
    /// updated row. Patching no rows is a backend error.
    async fn update(
        &self,
        table: &str,
        filters: &[(String, String)],
        patch: Value,
    ) -> Result<Value, ClientError>;

    /// Delete the rows matching the eq filters. Deleting nothing still
    /// succeeds.
    async fn delete(&self, table: &str, filters: &[(String, String)]) -> Result<(), ClientError>;
}
