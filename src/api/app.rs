//! Games, expansions and subscriptions

use serde::{Deserialize, Serialize};

use super::{Access, Amount, IgameApi};
use crate::cache::QueryKey;
use crate::client::NO_PARAMS;
use crate::error::ApiError;
use crate::exp::exp_to_level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Game,
    Expansion,
}

impl AppType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Game => "game",
            AppType::Expansion => "expansion",
        }
    }
}

impl std::fmt::Display for AppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "game" => Ok(AppType::Game),
            "expansion" => Ok(AppType::Expansion),
            other => Err(format!("unknown app type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: i64,
    pub tag_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppBriefInfo {
    pub id: i64,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub app_id: i64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub viewed: i64,
    pub downloaded: i64,
    pub subscribed: i64,
    pub allowed_exp: i64,
    pub vertical_image: String,
    pub horizontal_image: String,
    pub updated_at: String,
}

impl AppBriefInfo {
    /// Lowest user level allowed to browse this app
    pub fn required_level(&self) -> u32 {
        exp_to_level(self.allowed_exp)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub id: i64,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub app_id: i64,
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub viewed: i64,
    pub downloaded: i64,
    pub subscribed: i64,
    pub allowed_exp: i64,
    pub vertical_image: String,
    pub horizontal_image: String,
    #[serde(default)]
    pub content_images: Vec<String>,
    #[serde(default)]
    pub content_video_thumbs: Vec<String>,
    #[serde(default)]
    pub content_videos: Vec<String>,
    pub depend_app_id: Option<i64>,
    pub depend_app_name: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeStatus {
    pub subscribe: bool,
    pub created_at: Option<String>,
}

/// Listing parameters of `/app/brief_infos`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppListing {
    pub app_type: AppType,
    pub offset: i64,
    pub limit: i64,
    pub sort_by: String,
    pub tag_ids: Vec<i64>,
    pub depend_app_id: Option<i64>,
}

impl AppListing {
    pub fn new(app_type: AppType) -> Self {
        Self {
            app_type,
            offset: 0,
            limit: 20,
            sort_by: "updated_at".to_string(),
            tag_ids: Vec::new(),
            depend_app_id: None,
        }
    }

    fn tag_ids_csv(&self) -> String {
        self.tag_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Serialize)]
struct BriefInfosParams<'a> {
    #[serde(rename = "type")]
    app_type: AppType,
    offset: i64,
    limit: i64,
    sort_by: &'a str,
    tag_ids: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    depend_app_id: Option<i64>,
}

/// Lookup of a single app, by row id or by type and app id
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppLookup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub app_type: Option<AppType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,
}

impl IgameApi {
    pub async fn app_amount(&self, app_type: AppType) -> Result<i64, ApiError> {
        let amount: Amount = self
            .query(
                QueryKey::new("appAmount").part(app_type),
                Access::Anonymous,
                "/app/amount",
                &[("type", app_type.as_str())],
            )
            .await?;
        Ok(amount.amount)
    }

    pub async fn app_brief_infos(&self, listing: &AppListing) -> Result<Vec<AppBriefInfo>, ApiError> {
        let tag_ids = listing.tag_ids_csv();
        let key = QueryKey::new("appBriefInfos")
            .part(listing.app_type)
            .part(listing.offset)
            .part(listing.limit)
            .part(&listing.sort_by)
            .part(&tag_ids)
            .part_opt(listing.depend_app_id);
        let params = BriefInfosParams {
            app_type: listing.app_type,
            offset: listing.offset,
            limit: listing.limit,
            sort_by: &listing.sort_by,
            tag_ids,
            depend_app_id: listing.depend_app_id,
        };
        self.query(key, Access::Anonymous, "/app/brief_infos", &params)
            .await
    }

    pub async fn app_info(&self, lookup: &AppLookup) -> Result<AppInfo, ApiError> {
        let key = QueryKey::new("appInfo")
            .part_opt(lookup.id)
            .part_opt(lookup.app_type)
            .part_opt(lookup.app_id);
        self.query(key, Access::Authenticated, "/app/info", lookup)
            .await
    }

    pub async fn app_subscribe_status(&self, app_id: i64) -> Result<SubscribeStatus, ApiError> {
        self.query(
            QueryKey::new("appSubscribeStatus").part(app_id),
            Access::Authenticated,
            &format!("/app/{}/subscribe_status", app_id),
            NO_PARAMS,
        )
        .await
    }

    pub async fn app_subscribe(&self, app_id: i64) -> Result<(), ApiError> {
        self.mutate::<(), _, ()>(
            Access::Authenticated,
            &format!("/app/{}/subscribe", app_id),
            NO_PARAMS,
            None,
        )
        .await?;
        self.cache
            .invalidate(&QueryKey::new("appSubscribeStatus").part(app_id));
        Ok(())
    }

    pub async fn app_unsubscribe(&self, app_id: i64) -> Result<(), ApiError> {
        self.mutate::<(), _, ()>(
            Access::Authenticated,
            &format!("/app/{}/unsubscribe", app_id),
            NO_PARAMS,
            None,
        )
        .await?;
        self.cache
            .invalidate(&QueryKey::new("appSubscribeStatus").part(app_id));
        Ok(())
    }
}
