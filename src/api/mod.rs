//! # API Module
//!
//! Typed operations of the marketplace backend, grouped by resource:
//! - `app`: games and expansions, subscriptions
//! - `user`: login, registration, profile, daily bonus
//! - `resource`: downloadable resources and download links
//! - `notice`: site notices
//! - `tag`: tag listings
//! - `email`: email verification codes
//! - `verify_image`: slider captcha
//! - `alipay`: coin purchases
//!
//! Reads go through the [`QueryCache`]; writes only through the retry policy.
//! Operations needing credentials obtain their client from the [`AuthGateway`]
//! on every attempt.

pub mod alipay;
pub mod app;
pub mod email;
pub mod notice;
pub mod resource;
pub mod tag;
pub mod user;
pub mod verify_image;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::{QueryCache, QueryKey};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::gateway::AuthGateway;
use crate::policy::RetryPolicy;
use crate::store::TokenStore;

/// Whether an operation needs the user's credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Authenticated,
}

/// Response body of the various `/amount` endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub amount: i64,
}

pub struct IgameApi {
    gateway: AuthGateway,
    cache: QueryCache,
    retry: RetryPolicy,
}

impl IgameApi {
    pub fn new(gateway: AuthGateway, cache: QueryCache, retry: RetryPolicy) -> Self {
        Self {
            gateway,
            cache,
            retry,
        }
    }

    /// Build the whole client stack from configuration
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let base = HttpClient::new(config.api_url.clone(), config.timeout)?;
        Ok(Self::new(
            AuthGateway::new(base, store),
            QueryCache::new(config.cache.clone()),
            config.retry.clone(),
        ))
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn client_for(&self, access: Access) -> HttpClient {
        match access {
            Access::Anonymous => self.gateway.base().clone(),
            Access::Authenticated => self.gateway.authenticated_client().await,
        }
    }

    /// Cached GET
    pub(crate) async fn query<T, Q>(
        &self,
        key: QueryKey,
        access: Access,
        path: &str,
        params: &Q,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        self.cache
            .fetch(key, &self.retry, move || async move {
                self.client_for(access).await.get(path, params).await
            })
            .await
    }

    /// Uncached GET, for reads with side effects such as download links
    pub(crate) async fn fetch<T, Q>(&self, access: Access, path: &str, params: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        self.retry
            .run(move || async move { self.client_for(access).await.get(path, params).await })
            .await
    }

    pub(crate) async fn mutate<T, Q, B>(
        &self,
        access: Access,
        path: &str,
        params: &Q,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
        B: Serialize + ?Sized + Sync,
    {
        self.retry
            .run(move || async move {
                self.client_for(access)
                    .await
                    .post(path, params, body)
                    .await
            })
            .await
    }
}
