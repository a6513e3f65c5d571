//! Coin purchases through Alipay face-to-face payment

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Access, IgameApi};
use crate::client::NO_PARAMS;
use crate::error::ApiError;

const PAY_METHOD: &str = "dang_mian_fu";

/// Pending order with the QR code the user scans to pay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precreate {
    pub order_id: i64,
    pub trade_no: String,
    pub qr_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub trade_id: i64,
}

impl IgameApi {
    pub async fn alipay_precreate(&self, good_id: i64, good_amount: i64) -> Result<Precreate, ApiError> {
        self.mutate(
            Access::Authenticated,
            "/alipay/precreate",
            NO_PARAMS,
            Some(&json!({
                "pay_method": PAY_METHOD,
                "good_id": good_id,
                "good_amount": good_amount,
            })),
        )
        .await
    }

    /// Poll an order; fails until the payment has completed
    pub async fn alipay_query(&self, order_id: i64) -> Result<PaymentResult, ApiError> {
        self.fetch(Access::Authenticated, "/alipay/query", &[("order_id", order_id)])
            .await
    }
}
