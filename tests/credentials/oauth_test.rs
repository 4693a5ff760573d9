//! Tests for the cached OAuth2 client-credentials exchange.

use std::sync::Arc;

use wabridge::cache::{InMemoryTokenCache, SharedTokenCache, TokenCache};
use wabridge::credentials::{
    CredentialError, CredentialProvider, OAuth2ClientCredentials, SERPRO_TOKEN_CACHE_KEY,
};

use crate::support::FakeServer;

fn manager(server: &FakeServer, cache: &SharedTokenCache) -> OAuth2ClientCredentials {
    OAuth2ClientCredentials::new(
        reqwest::Client::new(),
        server.url("/oauth2/token"),
        "client-1".to_owned(),
        "secret-1".to_owned(),
        Arc::clone(cache),
    )
}

fn empty_cache() -> SharedTokenCache {
    Arc::new(InMemoryTokenCache::new())
}

// ---------------------------------------------------------------------------
// current()
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cached_token_skips_token_endpoint() {
    let server = FakeServer::start(Vec::new()).await;
    let cache = empty_cache();
    cache
        .set(SERPRO_TOKEN_CACHE_KEY, "cached-token")
        .await
        .expect("cache set");

    let creds = manager(&server, &cache)
        .current()
        .await
        .expect("current should succeed");

    assert_eq!(creds.token(), "cached-token");
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn cache_miss_fetches_and_stores_token() {
    let server = FakeServer::start(vec![(
        200,
        r#"{"access_token":"fresh-token","token_type":"Bearer","expires_in":3600}"#,
    )])
    .await;
    let cache = empty_cache();

    let creds = manager(&server, &cache)
        .current()
        .await
        .expect("current should succeed");

    assert_eq!(creds.token(), "fresh-token");
    assert_eq!(
        cache.get(SERPRO_TOKEN_CACHE_KEY).await.expect("cache get"),
        Some("fresh-token".to_owned())
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/oauth2/token");
    assert_eq!(
        requests[0].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert!(requests[0].body.contains("client_id=client-1"));
    assert!(requests[0].body.contains("client_secret=secret-1"));
}

#[tokio::test]
async fn empty_cached_token_is_ignored() {
    let server = FakeServer::start(vec![(200, r#"{"access_token":"fresh-token"}"#)]).await;
    let cache = empty_cache();
    cache.set(SERPRO_TOKEN_CACHE_KEY, "").await.expect("cache set");

    let creds = manager(&server, &cache)
        .current()
        .await
        .expect("current should succeed");

    assert_eq!(creds.token(), "fresh-token");
    assert_eq!(server.requests().len(), 1);
}

// ---------------------------------------------------------------------------
// reauthenticate()
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reauthenticate_replaces_cached_token() {
    let server = FakeServer::start(vec![(200, r#"{"access_token":"new-token"}"#)]).await;
    let cache = empty_cache();
    cache
        .set(SERPRO_TOKEN_CACHE_KEY, "stale-token")
        .await
        .expect("cache set");

    let creds = manager(&server, &cache)
        .reauthenticate()
        .await
        .expect("reauthenticate should succeed");

    assert_eq!(creds.token(), "new-token");
    assert_eq!(
        cache.get(SERPRO_TOKEN_CACHE_KEY).await.expect("cache get"),
        Some("new-token".to_owned())
    );
}

#[tokio::test]
async fn non_200_is_auth_service_error() {
    let server = FakeServer::start(vec![(
        401,
        r#"{"error":"invalid_client","access_token":"should-not-leak"}"#,
    )])
    .await;
    let cache = empty_cache();

    let err = match manager(&server, &cache).reauthenticate().await {
        Ok(creds) => panic!("expected failure, got {creds:?}"),
        Err(err) => err,
    };

    match err {
        CredentialError::AuthService { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid_client"));
            assert!(!body.contains("should-not-leak"));
        }
        other => panic!("expected auth service error, got: {other}"),
    }
    assert_eq!(
        cache.get(SERPRO_TOKEN_CACHE_KEY).await.expect("cache get"),
        None
    );
}

#[tokio::test]
async fn created_status_is_not_accepted() {
    let server = FakeServer::start(vec![(201, r#"{"access_token":"t"}"#)]).await;
    let result = manager(&server, &empty_cache()).current().await;
    assert!(matches!(
        result,
        Err(CredentialError::AuthService { status: 201, .. })
    ));
}

#[tokio::test]
async fn missing_access_token_is_an_error() {
    let server = FakeServer::start(vec![(200, r#"{"token_type":"Bearer"}"#)]).await;
    let result = manager(&server, &empty_cache()).current().await;
    assert!(matches!(result, Err(CredentialError::MissingAccessToken)));
}

#[tokio::test]
async fn non_json_token_response_is_missing_token() {
    let server = FakeServer::start(vec![(200, "<html>maintenance</html>")]).await;
    let result = manager(&server, &empty_cache()).current().await;
    assert!(matches!(result, Err(CredentialError::MissingAccessToken)));
}

#[test]
fn debug_redacts_client_secret() {
    let manager = OAuth2ClientCredentials::new(
        reqwest::Client::new(),
        "http://127.0.0.1:1/oauth2/token".to_owned(),
        "client-1".to_owned(),
        "secret-value".to_owned(),
        empty_cache(),
    );
    let debug = format!("{manager:?}");
    assert!(debug.contains("client-1"));
    assert!(!debug.contains("secret-value"));
}
