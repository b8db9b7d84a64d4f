//! PostgREST-backed [`TableClient`] implementation.

use reqwest::StatusCode;
use serde_json::Value;

use crate::client::{ClientError, SelectQuery, TableClient};
use crate::config::SupabaseConfig;

// PostgREST returns exactly one object (or an error) under this media type.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// HTTP client for one Supabase project's REST endpoint.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent("postbase/0.1")
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Reuse an existing `reqwest::Client` (connection pool) instead of
    /// building a fresh one.
    pub fn with_http_client(config: &SupabaseConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_role_key.clone(),
        }
    }

    fn table_url(&self, table: &str, params: &[String]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    fn auth(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        rb.header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    async fn read_body(resp: reqwest::Response) -> Result<String, ClientError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(backend_error(status, &body));
        }
        Ok(body)
    }
}

fn filter_params(filters: &[(String, String)]) -> Vec<String> {
    filters
        .iter()
        .map(|(column, value)| format!("{}=eq.{}", column, urlencoding::encode(value)))
        .collect()
}

fn select_params(query: &SelectQuery) -> Vec<String> {
    let mut params = Vec::new();
    if let Some(columns) = &query.columns {
        params.push(format!("select={}", columns));
    }
    params.extend(filter_params(&query.filters));
    if let Some((column, ascending)) = &query.order {
        let dir = if *ascending { "asc" } else { "desc" };
        params.push(format!("order={}.{}", column, dir));
    }
    params
}

/// Pull the PostgREST `message` out of an error body when there is one,
/// falling back to the raw status and body.
fn backend_error(status: StatusCode, body: &str) -> ClientError {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json
            .get("message")
            .or_else(|| json.get("msg"))
            .and_then(|m| m.as_str())
        {
            return ClientError::Backend(message.to_string());
        }
    }
    ClientError::Backend(format!("{} - {}", status, body))
}

#[async_trait::async_trait]
impl TableClient for SupabaseClient {
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>, ClientError> {
        let url = self.table_url(table, &select_params(&query));
        let resp = self.auth(self.http.get(&url)).send().await?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn select_single(&self, table: &str, query: SelectQuery) -> Result<Value, ClientError> {
        let url = self.table_url(table, &select_params(&query));
        let resp = self
            .auth(self.http.get(&url))
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, ClientError> {
        let url = self.table_url(table, &[]);
        let resp = self
            .auth(self.http.post(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&row)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[(String, String)],
        patch: Value,
    ) -> Result<Value, ClientError> {
        let url = self.table_url(table, &filter_params(filters));
        let resp = self
            .auth(self.http.patch(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&patch)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete(&self, table: &str, filters: &[(String, String)]) -> Result<(), ClientError> {
        let url = self.table_url(table, &filter_params(filters));
        let resp = self.auth(self.http.delete(&url)).send().await?;
        Self::read_body(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        let config = SupabaseConfig {
            url: "https://example.supabase.co".to_string(),
            service_role_key: "svc-key".to_string(),
        };
        SupabaseClient::new(&config).unwrap()
    }

    #[test]
    fn select_url_includes_filters_and_order() {
        let query = SelectQuery::new()
            .eq("id", "abc 123")
            .order("created_at", false);
        let url = client().table_url("posts", &select_params(&query));
        assert_eq!(
            url,
            "https://example.supabase.co/rest/v1/posts?id=eq.abc%20123&order=created_at.desc"
        );
    }

    #[test]
    fn bare_select_url_has_no_query_string() {
        let url = client().table_url("posts", &select_params(&SelectQuery::new()));
        assert_eq!(url, "https://example.supabase.co/rest/v1/posts");
    }

    #[test]
    fn backend_error_prefers_postgrest_message() {
        let err = backend_error(
            StatusCode::NOT_ACCEPTABLE,
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert_eq!(
            err.to_string(),
            "JSON object requested, multiple (or no) rows returned"
        );
    }

    #[test]
    fn backend_error_falls_back_to_status_and_body() {
        let err = backend_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "502 Bad Gateway - upstream down");
    }
}
