//! Thin reqwest wrapper bound to the API base url and, optionally, an access token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::error::ApiError;
use crate::token::TokenPair;

/// Query string for requests without parameters
pub const NO_PARAMS: &[(&str, &str)] = &[];

/// HTTP client for the marketplace API. Cloning is cheap; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpClient {
    /// Create the anonymous base client with a fixed request timeout
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // Url::join drops the last path segment unless it ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            access_token: None,
        }
    }

    /// Copy of this client that sends `token` on every request
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Copy of this client without credentials
    pub fn anonymous(&self) -> Self {
        Self {
            access_token: None,
            ..self.clone()
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.client.request(method, self.url(path)?);
        if let Some(token) = &self.access_token {
            builder = builder.header(header::AUTHORIZATION, format!("token {}", token));
        }
        Ok(builder)
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        let (_, body) = execute(builder).await?;
        decode(&body)
    }

    pub async fn post<T, Q, B>(&self, path: &str, query: &Q, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(Method::POST, path)?.query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let (_, body) = execute(builder).await?;
        decode(&body)
    }
}

async fn execute(builder: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
    let response = builder.send().await.map_err(|e| {
        if e.is_timeout() || e.is_connect() {
            ApiError::NoResponse(e.to_string())
        } else {
            ApiError::Network(e)
        }
    })?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok((status, body))
}

// Empty bodies decode as JSON `null` so `()` and `Option<_>` responses work.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Ok(serde_json::from_str("null")?);
    }
    Ok(serde_json::from_str(body)?)
}

/// Exchanges a refresh token for a fresh token pair.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, ApiError>;
}

#[async_trait]
impl TokenExchanger for HttpClient {
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let builder = self
            .anonymous()
            .request(Method::POST, "/user/token")?
            .json(&json!({ "refresh_token": refresh_token }));
        let (status, body) = execute(builder).await?;
        if status != StatusCode::OK {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(Url::parse(base).unwrap(), Duration::from_secs(8)).unwrap()
    }

    #[test]
    fn joins_paths_onto_base() {
        let c = client("https://api.igame.ml");
        assert_eq!(c.url("/user/token").unwrap().as_str(), "https://api.igame.ml/user/token");

        let c = client("http://localhost:8080/v1");
        assert_eq!(c.url("app/info").unwrap().as_str(), "http://localhost:8080/v1/app/info");
    }

    #[test]
    fn token_is_attached_to_copies_only() {
        let base = client("https://api.igame.ml");
        let authed = base.with_access_token("abc");
        assert!(!base.is_authenticated());
        assert_eq!(authed.access_token(), Some("abc"));
        assert!(!authed.anonymous().is_authenticated());
    }

    #[test]
    fn authorization_header_scheme() {
        let authed = client("https://api.igame.ml").with_access_token("abc");
        let request = authed.request(Method::GET, "/notice/amount").unwrap().build().unwrap();
        assert_eq!(request.headers()[header::AUTHORIZATION], "token abc");
    }

    #[test]
    fn empty_body_decodes_to_unit() {
        decode::<()>("").unwrap();
        let value: Option<i64> = decode("  ").unwrap();
        assert_eq!(value, None);
        assert!(decode::<i64>("{oops").is_err());
    }
}
