//! Logged-in user context, passed explicitly to the operations that change it.

use std::sync::Arc;

use tracing::info;

use crate::error::{ApiError, ErrorInfo};
use crate::store::{StoreError, TokenStore};
use crate::token::{is_valid_token, user_id_from_token, TokenPair};

pub struct Session {
    store: Arc<dyn TokenStore>,
    user_id: Option<i64>,
    from_url: Option<String>,
}

impl Session {
    /// Empty session over `store`, ignoring whatever it holds
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            user_id: None,
            from_url: None,
        }
    }

    /// Session for the user owning the stored refresh token, if it is still valid
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let user_id = store
            .refresh_token()
            .filter(|t| is_valid_token(t))
            .and_then(|t| user_id_from_token(&t));
        Self {
            store,
            user_id,
            from_url: None,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Remember where to go back to after logging in
    pub fn set_from_url(&mut self, url: Option<String>) {
        self.from_url = url;
    }

    pub fn take_from_url(&mut self) -> Option<String> {
        self.from_url.take()
    }

    /// Persist a freshly issued token pair and adopt its user
    pub fn login(&mut self, pair: &TokenPair) -> Result<(), StoreError> {
        self.store.set_access_token(Some(&pair.access_token))?;
        self.store.set_refresh_token(Some(&pair.refresh_token))?;
        self.user_id = pair.user_id.or_else(|| user_id_from_token(&pair.refresh_token));
        info!("Logged in as user {:?}", self.user_id);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.set_access_token(None)?;
        self.store.set_refresh_token(None)?;
        if let Some(id) = self.user_id.take() {
            info!("Logged out user {}", id);
        }
        Ok(())
    }

    /// React to a failed authenticated request. The session is dropped when
    /// the server answered and the failure is not scheduled maintenance.
    /// Returns whether the user was logged out.
    pub fn handle_rejection(&mut self, error: &ApiError) -> Result<bool, StoreError> {
        if error.status().is_none() {
            return Ok(false);
        }
        if ErrorInfo::from_error(Some(error)).is_maintenance() {
            return Ok(false);
        }
        self.logout()?;
        Ok(true)
    }
}
