use std::env;
use anyhow::{Context, Result};

/// Connection settings for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, no trailing slash.
    pub url: String,
    /// Service role key, used for both `apikey` and bearer auth.
    pub service_role_key: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self> {
        let url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL not set")?
            .trim()
            .trim_end_matches('/')
            .to_string();

        let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY not set")?
            .trim()
            .to_string();

        Ok(Self { url, service_role_key })
    }
}
