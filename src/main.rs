//! Connectivity self-check: verify the configured Supabase project is
//! reachable and the `posts` table answers a read.

use anyhow::Result;
use log::{error, info};

use postbase::config::SupabaseConfig;
use postbase::{PostRepository, SupabaseClient};

fn mask_key(k: &str) -> String {
    if k.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        format!("{}***{}", &k[..4], &k[k.len() - 4..])
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let config = SupabaseConfig::from_env()?;
    info!("Supabase URL: {}", config.url);
    info!("Supabase Key: {}", mask_key(&config.service_role_key));

    let client = SupabaseClient::new(&config)?;
    let repo = PostRepository::new(client);

    match repo.list().await {
        Ok(posts) => {
            info!("connection ok, posts table answered with {} rows", posts.len());
            Ok(())
        }
        Err(e) => {
            error!("Supabase connection failed: {}", e);
            std::process::exit(1);
        }
    }
}
