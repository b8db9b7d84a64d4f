//! Posts data layer over a Supabase-style PostgREST backend.
//!
//! The crate is split the same way the data flows: [`client`] speaks to the
//! store (one HTTP backend, one in-memory backend for tests), [`models`] holds
//! the row types for the `posts` table, and [`repositories`] wraps the client
//! in the five post operations with a single uniform error shape.

pub mod client;
pub mod config;
pub mod models;
pub mod repositories;

pub use client::{ClientError, SelectQuery, TableClient};
pub use client::memory::MemoryClient;
pub use client::supabase::SupabaseClient;
pub use models::post::{Post, PostInsert, PostUpdate};
pub use repositories::post_repository::{PostRepository, QueryError, QueryResult};
