//! Accounts: login, registration, profile and the daily bonus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{Access, IgameApi};
use crate::cache::QueryKey;
use crate::client::NO_PARAMS;
use crate::error::ApiError;
use crate::exp::{exp_to_level, next_level_exp};
use crate::session::Session;
use crate::time::{days_until, is_today, parse_backend_time};
use crate::token::TokenPair;

/// Role id granting VIP download privileges
pub const VIP_ROLE_ID: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
    pub expire_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub nick_name: String,
    pub exp: i64,
    pub coin: i64,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub avatar_url: String,
    pub login_at: String,
    pub created_at: String,
    pub daily_bonus_count: i64,
    pub last_daily_bonus_time: Option<String>,
}

impl UserInfo {
    pub fn level(&self) -> u32 {
        exp_to_level(self.exp)
    }

    pub fn next_level_exp(&self) -> i64 {
        next_level_exp(self.exp)
    }

    /// Remaining VIP days, or `None` for users without the VIP role
    pub fn vip_remaining_days(&self, now: DateTime<Utc>) -> Option<i64> {
        let role = self.roles.iter().find(|r| r.role_id == VIP_ROLE_ID)?;
        let expire_at = role.expire_at.as_deref().and_then(parse_backend_time)?;
        Some(days_until(expire_at, now))
    }

    pub fn claimed_daily_bonus_today(&self, now: DateTime<Utc>) -> bool {
        self.last_daily_bonus_time
            .as_deref()
            .and_then(parse_backend_time)
            .is_some_and(|at| is_today(at, now))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBonus {
    pub user_id: i64,
    pub daily_bonus_id: i64,
    pub count: i64,
    pub added_coin: i64,
    pub added_exp: i64,
    pub total_coin: i64,
    pub total_exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    #[serde(rename = "nick_name")]
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub verify_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub email: String,
    pub new_password: String,
    pub verify_code: String,
}

impl IgameApi {
    pub async fn user_info(&self, user_id: i64) -> Result<UserInfo, ApiError> {
        self.query(
            QueryKey::new("userInfo").part(user_id),
            Access::Authenticated,
            &format!("/user/{}/info", user_id),
            NO_PARAMS,
        )
        .await
    }

    /// Profile of the session's user. A rejection other than maintenance
    /// ends the session.
    pub async fn current_user(&self, session: &mut Session) -> Result<Option<UserInfo>, ApiError> {
        let Some(user_id) = session.user_id() else {
            return Ok(None);
        };
        match self.user_info(user_id).await {
            Ok(info) => Ok(Some(info)),
            Err(e) => {
                match session.handle_rejection(&e) {
                    Ok(true) => self.cache.clear(),
                    Ok(false) => {}
                    Err(store_err) => {
                        self.cache.clear();
                        tracing::warn!("Failed to clear rejected session: {}", store_err);
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn login(&self, session: &mut Session, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        let pair: TokenPair = self
            .mutate(
                Access::Anonymous,
                "/user/login",
                NO_PARAMS,
                Some(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.adopt(session, &pair);
        Ok(pair)
    }

    pub async fn register(&self, session: &mut Session, registration: &Registration) -> Result<TokenPair, ApiError> {
        let pair: TokenPair = self
            .mutate(Access::Anonymous, "/user/register", NO_PARAMS, Some(registration))
            .await?;
        self.adopt(session, &pair);
        Ok(pair)
    }

    pub async fn reset_password(&self, session: &mut Session, reset: &PasswordReset) -> Result<TokenPair, ApiError> {
        let pair: TokenPair = self
            .mutate(Access::Anonymous, "/user/reset_password", NO_PARAMS, Some(reset))
            .await?;
        self.adopt(session, &pair);
        Ok(pair)
    }

    /// Log out locally and forget everything cached for the user
    pub fn logout(&self, session: &mut Session) -> Result<(), crate::store::StoreError> {
        session.logout()?;
        self.cache.clear();
        Ok(())
    }

    /// Claim today's bonus; the cached profile is refreshed on success
    pub async fn daily_bonus(&self) -> Result<DailyBonus, ApiError> {
        let bonus: DailyBonus = self
            .mutate::<_, _, ()>(Access::Authenticated, "/user/daily_bonus", NO_PARAMS, None)
            .await?;
        self.cache
            .invalidate(&QueryKey::new("userInfo").part(bonus.user_id));
        info!(
            "Daily bonus #{} claimed: +{} exp, +{} coin",
            bonus.count, bonus.added_exp, bonus.added_coin
        );
        Ok(bonus)
    }

    fn adopt(&self, session: &mut Session, pair: &TokenPair) {
        // The account switched; nothing cached for the previous one applies.
        self.cache.clear();
        if let Err(e) = session.login(pair) {
            tracing::warn!("Failed to persist issued tokens: {}", e);
        }
    }
}
