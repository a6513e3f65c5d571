//! Authenticated request gateway
//!
//! Produces a ready-to-use [`HttpClient`] per call: the persisted access token
//! when it is still valid, a freshly exchanged one when only the refresh token
//! is, and the anonymous base client otherwise. Resolution never fails; a
//! request that needed credentials surfaces as a 401 downstream instead.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::{HttpClient, TokenExchanger};
use crate::store::TokenStore;
use crate::token::is_valid_token_at;

/// How the gateway arrived at the client it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// The persisted access token was still valid
    Cached,
    /// A new token pair was obtained from the refresh token
    Refreshed,
    /// No usable token was stored
    Anonymous,
    /// The refresh exchange failed and the anonymous client was used
    RefreshFailed,
}

pub struct AuthGateway {
    base: HttpClient,
    store: Arc<dyn TokenStore>,
    exchanger: Arc<dyn TokenExchanger>,
}

impl AuthGateway {
    /// Gateway that refreshes tokens through the API itself
    pub fn new(base: HttpClient, store: Arc<dyn TokenStore>) -> Self {
        let exchanger = Arc::new(base.anonymous());
        Self::with_exchanger(base, store, exchanger)
    }

    pub fn with_exchanger(
        base: HttpClient,
        store: Arc<dyn TokenStore>,
        exchanger: Arc<dyn TokenExchanger>,
    ) -> Self {
        Self {
            base: base.anonymous(),
            store,
            exchanger,
        }
    }

    /// The anonymous client
    pub fn base(&self) -> &HttpClient {
        &self.base
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Client for the next request, degrading to anonymous on any failure
    pub async fn authenticated_client(&self) -> HttpClient {
        self.resolve().await.0
    }

    pub async fn resolve(&self) -> (HttpClient, AuthState) {
        self.resolve_at(Utc::now()).await
    }

    /// Resolve credentials, judging token expiry against `now`
    pub async fn resolve_at(&self, now: DateTime<Utc>) -> (HttpClient, AuthState) {
        if let Some(access) = valid(self.store.access_token(), now) {
            return (self.base.with_access_token(access), AuthState::Cached);
        }

        let Some(refresh) = valid(self.store.refresh_token(), now) else {
            debug!("No valid tokens stored, using anonymous client");
            return (self.base.clone(), AuthState::Anonymous);
        };

        let pair = match self.exchanger.exchange(&refresh).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Token refresh failed, falling back to anonymous client: {}", e);
                return (self.base.clone(), AuthState::RefreshFailed);
            }
        };

        if let Err(e) = self
            .store
            .set_access_token(Some(&pair.access_token))
            .and_then(|_| self.store.set_refresh_token(Some(&pair.refresh_token)))
        {
            warn!("Failed to persist refreshed tokens: {}", e);
            return (self.base.clone(), AuthState::RefreshFailed);
        }

        info!("Access token refreshed for user {:?}", pair.user_id);
        (self.base.with_access_token(pair.access_token), AuthState::Refreshed)
    }
}

fn valid(token: Option<String>, now: DateTime<Utc>) -> Option<String> {
    token.filter(|t| is_valid_token_at(t, now))
}
