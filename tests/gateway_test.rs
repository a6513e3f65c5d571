use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use url::Url;

use igame_client::store::{MemoryTokenStore, TokenStore};
use igame_client::token::{TokenClaims, TokenPair};
use igame_client::{ApiError, AuthGateway, AuthState, HttpClient, TokenExchanger};

fn mint(expires_in: i64, user_id: Option<i64>) -> String {
    let claims = TokenClaims {
        exp: Utc::now().timestamp() + expires_in,
        iat: Some(Utc::now().timestamp()),
        user_id,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend")).unwrap()
}

enum Outcome {
    Issue(TokenPair),
    Fail,
}

struct FakeExchanger {
    calls: AtomicU32,
    outcome: Outcome,
}

impl FakeExchanger {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            outcome,
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchanger for FakeExchanger {
    async fn exchange(&self, _refresh_token: &str) -> Result<TokenPair, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Issue(pair) => Ok(pair.clone()),
            Outcome::Fail => Err(ApiError::NoResponse("simulated network error".into())),
        }
    }
}

fn base() -> HttpClient {
    HttpClient::new(Url::parse("http://127.0.0.1:9").unwrap(), Duration::from_secs(1)).unwrap()
}

fn gateway(store: &Arc<MemoryTokenStore>, exchanger: &Arc<FakeExchanger>) -> AuthGateway {
    AuthGateway::with_exchanger(base(), store.clone(), exchanger.clone())
}

#[tokio::test]
async fn valid_access_token_is_reused() {
    let store = Arc::new(MemoryTokenStore::new());
    let access = mint(600, None);
    store.set_access_token(Some(&access)).unwrap();
    store.set_refresh_token(Some(&mint(86_400, Some(1)))).unwrap();
    let exchanger = FakeExchanger::new(Outcome::Fail);

    let (client, state) = gateway(&store, &exchanger).resolve().await;

    assert_eq!(state, AuthState::Cached);
    assert_eq!(client.access_token(), Some(access.as_str()));
    assert_eq!(exchanger.calls(), 0);
}

#[tokio::test]
async fn expiring_access_token_is_refreshed_once() {
    let store = Arc::new(MemoryTokenStore::new());
    store.set_access_token(Some(&mint(30, None))).unwrap();
    store.set_refresh_token(Some(&mint(86_400, Some(1)))).unwrap();

    let issued = TokenPair {
        user_id: Some(1),
        access_token: mint(3600, None),
        refresh_token: mint(7 * 86_400, Some(1)),
    };
    let exchanger = FakeExchanger::new(Outcome::Issue(issued.clone()));

    let (client, state) = gateway(&store, &exchanger).resolve().await;

    assert_eq!(state, AuthState::Refreshed);
    assert_eq!(exchanger.calls(), 1);
    assert_eq!(client.access_token(), Some(issued.access_token.as_str()));
    assert_eq!(store.access_token(), Some(issued.access_token));
    assert_eq!(store.refresh_token(), Some(issued.refresh_token));
}

#[tokio::test]
async fn no_valid_tokens_means_anonymous_without_exchange() {
    let store = Arc::new(MemoryTokenStore::new());
    let exchanger = FakeExchanger::new(Outcome::Fail);

    let (client, state) = gateway(&store, &exchanger).resolve().await;
    assert_eq!(state, AuthState::Anonymous);
    assert!(!client.is_authenticated());

    store.set_access_token(Some(&mint(-100, None))).unwrap();
    store.set_refresh_token(Some(&mint(10, Some(1)))).unwrap();
    let (client, state) = gateway(&store, &exchanger).resolve().await;
    assert_eq!(state, AuthState::Anonymous);
    assert!(!client.is_authenticated());

    store.set_refresh_token(Some("garbage")).unwrap();
    assert!(!gateway(&store, &exchanger).authenticated_client().await.is_authenticated());

    assert_eq!(exchanger.calls(), 0);
}

#[tokio::test]
async fn failed_exchange_falls_back_to_anonymous() {
    let store = Arc::new(MemoryTokenStore::new());
    let refresh = mint(86_400, Some(4));
    store.set_refresh_token(Some(&refresh)).unwrap();
    let exchanger = FakeExchanger::new(Outcome::Fail);

    let (client, state) = gateway(&store, &exchanger).resolve().await;

    assert_eq!(state, AuthState::RefreshFailed);
    assert!(!client.is_authenticated());
    assert_eq!(exchanger.calls(), 1);
    // Nothing is written on failure.
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), Some(refresh));
}

#[tokio::test]
async fn expiry_margin_is_sixty_seconds() {
    let now = Utc::now();
    let store = Arc::new(MemoryTokenStore::new());
    let exchanger = FakeExchanger::new(Outcome::Fail);

    let claims = |exp| TokenClaims { exp, iat: None, user_id: None };
    let key = EncodingKey::from_secret(b"backend");

    let at_59 = encode(&Header::default(), &claims(now.timestamp() + 59), &key).unwrap();
    store.set_access_token(Some(&at_59)).unwrap();
    let (_, state) = gateway(&store, &exchanger).resolve_at(now).await;
    assert_eq!(state, AuthState::Anonymous);

    let at_60 = encode(&Header::default(), &claims(now.timestamp() + 60), &key).unwrap();
    store.set_access_token(Some(&at_60)).unwrap();
    let (client, state) = gateway(&store, &exchanger).resolve_at(now).await;
    assert_eq!(state, AuthState::Cached);
    assert_eq!(client.access_token(), Some(at_60.as_str()));
}
