//! Email verification codes for registration and password reset

use serde::Serialize;

use super::{Access, IgameApi};
use crate::client::NO_PARAMS;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
    RegisterUser,
    ResetPassword,
}

#[derive(Serialize)]
struct VerifyEmailBody<'a> {
    email_addr: &'a str,
    email_type: EmailType,
}

impl IgameApi {
    /// Ask the backend to mail a verification code to `email_addr`
    pub async fn verify_email(&self, email_addr: &str, email_type: EmailType) -> Result<(), ApiError> {
        self.mutate(
            Access::Anonymous,
            "/email/verify",
            NO_PARAMS,
            Some(&VerifyEmailBody {
                email_addr,
                email_type,
            }),
        )
        .await
    }
}
