//! In-memory [`TableClient`] — a test double with the same observable
//! semantics as the PostgREST backend.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::client::{ClientError, SelectQuery, TableClient};

// Message PostgREST emits when a single-object request matches != 1 rows.
const SINGLE_ROW_ERROR: &str = "JSON object requested, multiple (or no) rows returned";

/// Process-local table store. Rows are plain JSON objects; ids are assigned on
/// insert when absent, mirroring the server-side default.
#[derive(Default)]
pub struct MemoryClient {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    fail_with: Option<String>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every operation fails with the given backend message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Load rows directly, bypassing insert-side id assignment. Intended for
    /// test setup.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        match &self.fail_with {
            Some(message) => Err(ClientError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

fn matches_filters(row: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, value)| match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == *value,
    })
}

fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    let (a, b) = (a.get(column), b.get(column));
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn apply_query(rows: &[Value], query: &SelectQuery) -> Vec<Value> {
    let mut out: Vec<Value> = rows
        .iter()
        .filter(|row| matches_filters(row, &query.filters))
        .cloned()
        .collect();
    if let Some((column, ascending)) = &query.order {
        out.sort_by(|a, b| {
            let ord = compare_column(a, b, column);
            if *ascending { ord } else { ord.reverse() }
        });
    }
    out
}

#[async_trait]
impl TableClient for MemoryClient {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>, ClientError> {
        self.check_failure()?;
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(apply_query(rows, &query))
    }

    async fn select_single(&self, table: &str, query: SelectQuery) -> Result<Value, ClientError> {
        let mut rows = self.select(table, query).await?;
        if rows.len() != 1 {
            return Err(ClientError::Backend(SINGLE_ROW_ERROR.to_string()));
        }
        Ok(rows.remove(0))
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Value, ClientError> {
        self.check_failure()?;
        if let Some(object) = row.as_object_mut() {
            let missing_id = !matches!(object.get("id"), Some(Value::String(_)));
            if missing_id {
                object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
        }
        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[(String, String)],
        patch: Value,
    ) -> Result<Value, ClientError> {
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        let mut updated = None;
        for row in rows.iter_mut().filter(|row| matches_filters(row, filters)) {
            if updated.is_some() {
                return Err(ClientError::Backend(SINGLE_ROW_ERROR.to_string()));
            }
            if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated = Some(row.clone());
        }

        updated.ok_or_else(|| ClientError::Backend(SINGLE_ROW_ERROR.to_string()))
    }

    async fn delete(&self, table: &str, filters: &[(String, String)]) -> Result<(), ClientError> {
        self.check_failure()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !matches_filters(row, filters));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_id_when_absent() {
        let client = MemoryClient::new();
        let row = client
            .insert("posts", json!({"title": "hello"}))
            .await
            .unwrap();
        assert!(row["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn insert_keeps_caller_supplied_id() {
        let client = MemoryClient::new();
        let row = client
            .insert("posts", json!({"id": "fixed", "title": "hello"}))
            .await
            .unwrap();
        assert_eq!(row["id"], "fixed");
    }

    #[tokio::test]
    async fn select_single_rejects_zero_and_many() {
        let client = MemoryClient::new();
        let none = client
            .select_single("posts", SelectQuery::new().eq("id", "missing"))
            .await;
        assert!(none.is_err());

        client.seed(
            "posts",
            vec![
                json!({"id": "a", "title": "one"}),
                json!({"id": "a", "title": "two"}),
            ],
        );
        let many = client
            .select_single("posts", SelectQuery::new().eq("id", "a"))
            .await;
        assert_eq!(many.unwrap_err().to_string(), SINGLE_ROW_ERROR);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_an_error() {
        let client = MemoryClient::new();
        let result = client
            .update(
                "posts",
                &[("id".to_string(), "missing".to_string())],
                json!({"title": "new"}),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_of_missing_row_succeeds() {
        let client = MemoryClient::new();
        let result = client
            .delete("posts", &[("id".to_string(), "missing".to_string())])
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failing_client_surfaces_its_message() {
        let client = MemoryClient::failing("connection refused");
        let err = client.select("posts", SelectQuery::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
