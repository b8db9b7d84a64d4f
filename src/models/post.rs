use serde::{Deserialize, Serialize};

/// One row of the `posts` table.
///
/// Timestamps stay as the RFC 3339 strings the store hands back; callers that
/// need real instants can parse them with chrono.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert shape for `posts`. `id` is server-assigned when omitted; the
/// repository stamps `created_at`/`updated_at` itself, overriding anything
/// supplied here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Partial patch for `posts`. Fields left as `None` are not serialized, so the
/// store leaves them unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
