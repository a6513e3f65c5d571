//! Tag listings per category

use super::app::Tag;
use super::{Access, IgameApi};
use crate::cache::QueryKey;
use crate::error::ApiError;

impl IgameApi {
    /// Tags of one category, e.g. `game`
    pub async fn tag_infos(&self, tag_type: &str) -> Result<Vec<Tag>, ApiError> {
        self.query(
            QueryKey::new("tagInfos").part(tag_type),
            Access::Anonymous,
            "/tag/infos",
            &[("tag_type", tag_type)],
        )
        .await
    }
}
