//! Slider captcha guarding sensitive endpoints

use serde::{Deserialize, Serialize};

use super::{Access, IgameApi};
use crate::error::ApiError;

/// Captcha images; the puzzle piece sits `top` pixels from the top edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyImage {
    pub top: i64,
    #[serde(rename = "backgroud_url")]
    pub background_url: String,
    pub puzzle_url: String,
}

impl IgameApi {
    /// New captcha for the protected `endpoint`
    pub async fn verify_image_new(&self, endpoint: &str) -> Result<VerifyImage, ApiError> {
        self.mutate::<_, _, ()>(
            Access::Anonymous,
            "/verify_image/new",
            &[("endpoint", endpoint)],
            None,
        )
        .await
    }

    /// Submit the horizontal offset the user slid the puzzle piece to
    pub async fn verify_image_verify(&self, endpoint: &str, left: i64) -> Result<(), ApiError> {
        let left = left.to_string();
        self.mutate::<_, _, ()>(
            Access::Anonymous,
            "/verify_image/verify",
            &[("endpoint", endpoint), ("left", left.as_str())],
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_spelling() {
        let raw = r#"{"top": 40, "backgroud_url": "bg.png", "puzzle_url": "p.png"}"#;
        let image: VerifyImage = serde_json::from_str(raw).unwrap();
        assert_eq!(image.background_url, "bg.png");
        assert_eq!(image.top, 40);
    }
}
