//! Downloadable resources of an app

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Access, Amount, IgameApi};
use crate::cache::QueryKey;
use crate::client::NO_PARAMS;
use crate::error::ApiError;

/// Download mirror tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderGroup {
    Normal,
    Fast,
}

impl ProviderGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderGroup::Normal => "normal",
            ProviderGroup::Fast => "fast",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceBriefInfo {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub allowed_exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: i64,
    pub app_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: i64,
    pub version: String,
    pub description: String,
    pub allowed_exp: i64,
    pub downloaded: i64,
    pub can_normal_download: bool,
    pub can_fast_download: bool,
    #[serde(default)]
    pub require_systems: Vec<i64>,
    pub require_disk: i64,
    pub updated_at: String,
}

impl ResourceInfo {
    pub fn can_download(&self, group: ProviderGroup) -> bool {
        match group {
            ProviderGroup::Normal => self.can_normal_download,
            ProviderGroup::Fast => self.can_fast_download,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadUrl {
    pub trade_id: i64,
    pub download_url: String,
    /// Coins left after paying for a fast download
    pub remain_coin: Option<i64>,
    pub downloaded: i64,
}

#[derive(Serialize)]
struct BriefInfosParams {
    offset: i64,
    limit: i64,
    app_id: i64,
}

impl IgameApi {
    pub async fn resource_amount(&self, app_id: i64) -> Result<i64, ApiError> {
        let amount: Amount = self
            .query(
                QueryKey::new("resourceAmount").part(app_id),
                Access::Anonymous,
                "/resource/amount",
                &[("app_id", app_id)],
            )
            .await?;
        Ok(amount.amount)
    }

    pub async fn resource_brief_infos(
        &self,
        app_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ResourceBriefInfo>, ApiError> {
        self.query(
            QueryKey::new("resourceBriefInfos")
                .part(offset)
                .part(limit)
                .part(app_id),
            Access::Anonymous,
            "/resource/brief_infos",
            &BriefInfosParams {
                offset,
                limit,
                app_id,
            },
        )
        .await
    }

    pub async fn resource_info(&self, resource_id: i64) -> Result<ResourceInfo, ApiError> {
        self.query(
            QueryKey::new("resourceInfo").part(resource_id),
            Access::Authenticated,
            &format!("/resource/{}/info", resource_id),
            NO_PARAMS,
        )
        .await
    }

    /// Request a download link. Fast links may charge coins, so the result
    /// is never cached.
    pub async fn resource_download_url(
        &self,
        resource_id: i64,
        group: ProviderGroup,
    ) -> Result<DownloadUrl, ApiError> {
        let url: DownloadUrl = self
            .fetch(
                Access::Authenticated,
                &format!("/resource/{}/download_url", resource_id),
                &[("provider_group", group.as_str())],
            )
            .await?;
        info!(
            "Download link for resource {} issued (trade {})",
            resource_id, url.trade_id
        );
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_resource_info() {
        let raw = r#"{
            "id": 5, "app_id": 1, "name": "Base game", "type": 1, "version": "1.2",
            "description": "", "allowed_exp": 0, "downloaded": 40,
            "can_normal_download": true, "can_fast_download": false,
            "require_systems": [1, 2], "require_disk": 2048,
            "updated_at": "2022-05-01 10:00:00"
        }"#;
        let info: ResourceInfo = serde_json::from_str(raw).unwrap();
        assert!(info.can_download(ProviderGroup::Normal));
        assert!(!info.can_download(ProviderGroup::Fast));
        assert_eq!(info.require_systems, vec![1, 2]);
    }

    #[test]
    fn download_url_without_coin_charge() {
        let raw = r#"{"trade_id": 3, "download_url": "https://x", "downloaded": 41}"#;
        let url: DownloadUrl = serde_json::from_str(raw).unwrap();
        assert_eq!(url.remain_coin, None);
        assert_eq!(serde_json::to_value(ProviderGroup::Fast).unwrap(), "fast");
    }
}
