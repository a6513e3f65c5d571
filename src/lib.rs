//! # iGame Client
//!
//! Async client for the iGame game-download marketplace API.
//!
//! ## Features
//! - Authenticated request gateway with transparent access-token refresh
//! - Persisted token store (in memory or JSON file)
//! - Query cache with staleness and idle eviction windows
//! - Retry policy that never repeats maintenance or rate-limit failures
//! - Typed operations for apps, users, resources, notices and payments
//!
//! ## Architecture
//! - `gateway`: picks the credentials for each request
//! - `client`: reqwest wrapper bound to the API base url
//! - `token` / `store` / `session`: token claims, persistence and the
//!   logged-in user context
//! - `policy` / `cache`: retry rules and the query cache
//! - `api`: the endpoint surface, one module per backend resource
//! - `error`: request errors and their user-facing categorization
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use igame_client::{api::IgameApi, config::Config, session::Session, store::MemoryTokenStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let store = Arc::new(MemoryTokenStore::new());
//! let api = IgameApi::from_config(&config, store.clone())?;
//! let mut session = Session::restore(store);
//! api.login(&mut session, "player@example.com", "secret").await?;
//! let bonus = api.daily_bonus().await?;
//! println!("streak: {}", bonus.count);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod exp;
pub mod gateway;
pub mod policy;
pub mod session;
pub mod store;
pub mod time;
pub mod token;

pub use api::IgameApi;
pub use client::{HttpClient, TokenExchanger};
pub use error::{ApiError, ErrorInfo};
pub use gateway::{AuthGateway, AuthState};
pub use session::Session;
