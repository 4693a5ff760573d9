//! Tests for credential values and static tokens.

use wabridge::credentials::{CredentialProvider, Credentials, StaticToken, TokenSource};

#[test]
fn fixed_credentials_are_static() {
    let creds = Credentials::fixed("EAAR-token");
    assert_eq!(creds.token(), "EAAR-token");
    assert_eq!(creds.source(), TokenSource::Static);
    assert!(!creds.expiry_known());
}

#[test]
fn oauth2_credentials_have_unknown_expiry() {
    let creds = Credentials::oauth2("serpro-token");
    assert_eq!(creds.source(), TokenSource::OAuth2);
    assert!(!creds.expiry_known());
    assert_eq!(creds.bearer(), "Bearer serpro-token");
}

#[test]
fn debug_never_prints_the_token() {
    let debug = format!("{:?}", Credentials::fixed("EAAR-very-secret"));
    assert!(!debug.contains("EAAR-very-secret"));
}

#[tokio::test]
async fn static_token_reauthentication_returns_same_token() {
    let provider = StaticToken::new("EAAR-token");
    let current = provider.current().await.expect("current should succeed");
    let again = provider
        .reauthenticate()
        .await
        .expect("reauthenticate should succeed");
    assert_eq!(current.token(), "EAAR-token");
    assert_eq!(again.token(), "EAAR-token");
}
