//! Site notices and their locally tracked read state

use serde::{Deserialize, Serialize};

use super::{Access, Amount, IgameApi};
use crate::cache::QueryKey;
use crate::client::NO_PARAMS;
use crate::error::ApiError;
use crate::store::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeInfo {
    pub notice_id: i64,
    pub title: String,
    pub content: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Serialize)]
struct PageParams {
    offset: i64,
    limit: i64,
}

impl IgameApi {
    pub async fn notice_amount(&self) -> Result<i64, ApiError> {
        let amount: Amount = self
            .query(
                QueryKey::new("noticeAmount"),
                Access::Authenticated,
                "/notice/amount",
                NO_PARAMS,
            )
            .await?;
        Ok(amount.amount)
    }

    pub async fn notice_unread_amount(&self) -> Result<i64, ApiError> {
        let amount: Amount = self
            .query(
                QueryKey::new("noticeUnreadAmount"),
                Access::Authenticated,
                "/notice/unread_amount",
                NO_PARAMS,
            )
            .await?;
        Ok(amount.amount)
    }

    pub async fn notice_infos(&self, offset: i64, limit: i64) -> Result<Vec<NoticeInfo>, ApiError> {
        self.query(
            QueryKey::new("noticeInfos").part(offset).part(limit),
            Access::Authenticated,
            "/notice/infos",
            &PageParams { offset, limit },
        )
        .await
    }

    /// Remember that a notice was read on this device
    pub fn mark_notice_read(&self, notice_id: i64) -> Result<(), StoreError> {
        let store = self.gateway.store();
        let mut ids = store.read_notice_ids();
        if !ids.contains(&notice_id) {
            ids.push(notice_id);
            store.set_read_notice_ids(&ids)?;
        }
        Ok(())
    }

    /// Notices neither the server nor this device has seen read
    pub fn unread_notices<'a>(&self, notices: &'a [NoticeInfo]) -> Vec<&'a NoticeInfo> {
        let local = self.gateway.store().read_notice_ids();
        notices
            .iter()
            .filter(|n| !n.read && !local.contains(&n.notice_id))
            .collect()
    }
}
