//! Token lifecycle against a mocked OAuth endpoint: cached, refreshed,
//! exchanged.

use std::path::{Path, PathBuf};

use orgdocs::auth::{Authenticator, Credentials, StoredToken};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_credentials(dir: &Path) -> PathBuf {
    let p = dir.join("credentials.json");
    std::fs::write(
        &p,
        serde_json::json!({
            "installed": {
                "client_id": "client-123",
                "client_secret": "secret-xyz",
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]
            }
        })
        .to_string(),
    )
    .unwrap();
    p
}

fn write_token(dir: &Path, token: &StoredToken) -> PathBuf {
    let p = dir.join("token.json");
    std::fs::write(&p, serde_json::to_string(token).unwrap()).unwrap();
    p
}

fn authenticator(dir: &Path, server: &MockServer) -> Authenticator {
    Authenticator::new(dir.join("credentials.json"), dir.join("token.json")).with_endpoints(
        &format!("{}/auth", server.uri()),
        &format!("{}/token", server.uri()),
    )
}

fn token_response(access: &str, refresh: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": access,
        "expires_in": 3599,
        "scope": "https://www.googleapis.com/auth/drive",
        "token_type": "Bearer"
    });
    if let Some(rt) = refresh {
        body["refresh_token"] = serde_json::json!(rt);
    }
    body
}

#[tokio::test]
async fn valid_cached_token_is_used_without_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    write_credentials(dir.path());
    write_token(
        dir.path(),
        &StoredToken {
            access_token: "cached-at".to_string(),
            refresh_token: Some("rt".to_string()),
            scope: None,
            token_type: Some("Bearer".to_string()),
            expiry_date: Some(chrono::Utc::now().timestamp_millis() + 3600 * 1000),
        },
    );

    // No mocks mounted: any request to the server would 404 and fail.
    let token = authenticator(dir.path(), &server)
        .access_token()
        .await
        .unwrap();
    assert_eq!(token, "cached-at");
}

#[tokio::test]
async fn expired_cached_token_is_refreshed_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    write_credentials(dir.path());
    let token_path = write_token(
        dir.path(),
        &StoredToken {
            access_token: "stale-at".to_string(),
            refresh_token: Some("rt-1".to_string()),
            scope: None,
            token_type: Some("Bearer".to_string()),
            expiry_date: Some(chrono::Utc::now().timestamp_millis() - 1000),
        },
    );

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=rt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("fresh-at", None)))
        .expect(1)
        .mount(&server)
        .await;

    let token = authenticator(dir.path(), &server)
        .access_token()
        .await
        .unwrap();
    assert_eq!(token, "fresh-at");

    // The rotated token file keeps the prior refresh token when the
    // response omits one.
    let stored: StoredToken =
        serde_json::from_slice(&std::fs::read(&token_path).unwrap()).unwrap();
    assert_eq!(stored.access_token, "fresh-at");
    assert_eq!(stored.refresh_token.as_deref(), Some("rt-1"));
    assert!(!stored.is_expired());
}

#[tokio::test]
async fn code_exchange_posts_the_authorization_code_grant() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let creds_path = write_credentials(dir.path());
    let credentials = Credentials::load(&creds_path).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("client_id=client-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response("new-at", Some("new-rt"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = authenticator(dir.path(), &server)
        .exchange_code(&credentials, "the-code")
        .await
        .unwrap();
    assert_eq!(token.access_token, "new-at");
    assert_eq!(token.refresh_token.as_deref(), Some("new-rt"));
    assert!(!token.is_expired());
}

#[tokio::test]
async fn rejected_code_exchange_surfaces_the_error_body() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let creds_path = write_credentials(dir.path());
    let credentials = Credentials::load(&creds_path).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let err = authenticator(dir.path(), &server)
        .exchange_code(&credentials, "bad-code")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn missing_credentials_file_is_a_descriptive_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;

    let err = authenticator(dir.path(), &server)
        .access_token()
        .await
        .unwrap_err();
    assert!(
        err.to_string().contains("client secret file"),
        "got: {err:#}"
    );
}
