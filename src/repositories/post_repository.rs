//! The five post operations, with one uniform error shape.
//!
//! Each operation is a single stateless round trip through a [`TableClient`].
//! No validation, no retry, no caching here: the backend's verdict is the
//! verdict, collapsed to a human-readable message. Timestamps are stamped on
//! this side of the wire (stamp-then-send), never left to store defaults.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::client::{ClientError, SelectQuery, TableClient};
use crate::models::post::{Post, PostInsert, PostUpdate};

const POSTS_TABLE: &str = "posts";

/// The one failure kind operations report: the backend said no. Not-found,
/// conflict, and connectivity all collapse into the carried message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ClientError> for QueryError {
    fn from(err: ClientError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::from(err).into()
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// CRUD over the `posts` table, generic over the backend.
pub struct PostRepository<C> {
    client: C,
}

impl<C: TableClient> PostRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// All posts, newest first. An empty table is `Ok(vec![])`, not an error.
    pub async fn list(&self) -> QueryResult<Vec<Post>> {
        let rows = self
            .client
            .select(POSTS_TABLE, SelectQuery::new().order("created_at", false))
            .await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(QueryError::from))
            .collect()
    }

    /// The single post with this id. Zero or multiple matches surface as a
    /// backend error.
    pub async fn get_by_id(&self, id: &str) -> QueryResult<Post> {
        let row = self
            .client
            .select_single(POSTS_TABLE, SelectQuery::new().eq("id", id))
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Insert a new post. `created_at` and `updated_at` are stamped here with
    /// one reading of the clock, overriding anything the caller supplied.
    pub async fn create(&self, post: PostInsert) -> QueryResult<Post> {
        let now = now_rfc3339();
        let mut row = serde_json::to_value(&post)?;
        if let Some(object) = row.as_object_mut() {
            object.insert("created_at".to_string(), Value::String(now.clone()));
            object.insert("updated_at".to_string(), Value::String(now));
        }
        let stored = self.client.insert(POSTS_TABLE, row).await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Patch the post with this id. Only supplied fields change, plus a fresh
    /// `updated_at`.
    pub async fn update(&self, id: &str, updates: PostUpdate) -> QueryResult<Post> {
        let mut patch = serde_json::to_value(&updates)?;
        if let Some(object) = patch.as_object_mut() {
            object.insert("updated_at".to_string(), Value::String(now_rfc3339()));
        }
        let row = self
            .client
            .update(POSTS_TABLE, &id_filter(id), patch)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Remove the post with this id.
    pub async fn delete(&self, id: &str) -> QueryResult<()> {
        self.client.delete(POSTS_TABLE, &id_filter(id)).await?;
        Ok(())
    }
}

fn id_filter(id: &str) -> [(String, String); 1] {
    [("id".to_string(), id.to_string())]
}

// Same shape JavaScript's `new Date().toISOString()` produces, so rows written
// by this crate sort alongside rows written by the web client.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn timestamps_are_utc_rfc3339_with_millis() {
        let stamp = now_rfc3339();
        assert!(stamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
        // "2024-01-01T00:00:00.000Z"
        assert_eq!(stamp.len(), 24);
    }
}
