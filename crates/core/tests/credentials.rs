//! Token exchange for both credential kinds against a fake token endpoint.

use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Form, Json, Router};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use drivetube_core::auth::{
    AuthError, AuthorizedUserCredentials, ServiceAccountCredentials, TokenProvider,
    DRIVE_READONLY_SCOPE,
};

const TEST_KEY: &str = include_str!("fixtures/test-rsa-key.pem");

#[derive(Clone, Default)]
struct FakeTokenEndpoint {
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn token(
    State(state): State<FakeTokenEndpoint>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let grant = form.get("grant_type").cloned().unwrap_or_default();
    let refresh = form.get("refresh_token").cloned().unwrap_or_default();
    state.requests.lock().unwrap().push(form);

    if refresh == "revoked" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        );
    }

    let n = state.requests.lock().unwrap().len();
    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("{}-token-{}", grant.rsplit(':').next().unwrap_or(""), n),
            "expires_in": 3600,
            "token_type": "Bearer"
        })),
    )
}

async fn spawn(state: FakeTokenEndpoint) -> SocketAddr {
    let app = Router::new().route("/token", post(token)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn json_file(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_service_account_exchanges_signed_assertion() {
    let state = FakeTokenEndpoint::default();
    let addr = spawn(state.clone()).await;
    let token_uri = format!("http://{}/token", addr);
    let key_file = json_file(&json!({
        "type": "service_account",
        "client_email": "uploader@farm-project.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "private_key_id": "key-1",
        "token_uri": token_uri,
    }));

    let credentials =
        ServiceAccountCredentials::from_file(key_file.path(), DRIVE_READONLY_SCOPE).unwrap();
    let access = credentials.access_token().await.unwrap();
    assert_eq!(access, "jwt-bearer-token-1");

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].get("grant_type").map(String::as_str),
        Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
    );

    let assertion = requests[0].get("assertion").unwrap();
    let header = decode_header(assertion).unwrap();
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("key-1"));

    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    let claims = decode::<Value>(assertion, &DecodingKey::from_secret(&[]), &validation)
        .unwrap()
        .claims;
    assert_eq!(claims["iss"], "uploader@farm-project.iam.gserviceaccount.com");
    assert_eq!(claims["scope"], DRIVE_READONLY_SCOPE);
    assert_eq!(claims["aud"], token_uri.as_str());
    assert_eq!(
        claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
        3600
    );
}

#[tokio::test]
async fn test_tokens_are_cached_until_expiry() {
    let state = FakeTokenEndpoint::default();
    let addr = spawn(state.clone()).await;
    let key_file = json_file(&json!({
        "type": "service_account",
        "client_email": "uploader@farm-project.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": format!("http://{}/token", addr),
    }));

    let credentials =
        ServiceAccountCredentials::from_file(key_file.path(), DRIVE_READONLY_SCOPE).unwrap();
    let first = credentials.access_token().await.unwrap();
    let second = credentials.access_token().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(state.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_authorized_user_refreshes_with_refresh_token() {
    let state = FakeTokenEndpoint::default();
    let addr = spawn(state.clone()).await;
    let token_file = json_file(&json!({
        "client_id": "client-1.apps.googleusercontent.com",
        "client_secret": "s3cret",
        "refresh_token": "1//refresh",
        "token_uri": format!("http://{}/token", addr),
    }));

    let credentials = AuthorizedUserCredentials::from_file(token_file.path()).unwrap();
    let access = credentials.access_token().await.unwrap();
    assert_eq!(access, "refresh_token-token-1");

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let form = &requests[0];
    assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
    assert_eq!(form.get("refresh_token").map(String::as_str), Some("1//refresh"));
    assert_eq!(
        form.get("client_id").map(String::as_str),
        Some("client-1.apps.googleusercontent.com")
    );
    assert_eq!(form.get("client_secret").map(String::as_str), Some("s3cret"));
}

#[tokio::test]
async fn test_revoked_refresh_token_is_rejected() {
    let state = FakeTokenEndpoint::default();
    let addr = spawn(state.clone()).await;
    let token_file = json_file(&json!({
        "client_id": "c",
        "client_secret": "s",
        "refresh_token": "revoked",
        "token_uri": format!("http://{}/token", addr),
    }));

    let credentials = AuthorizedUserCredentials::from_file(token_file.path()).unwrap();
    let err = credentials.access_token().await.unwrap_err();

    match err {
        AuthError::TokenRejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("invalid_grant"));
        }
        other => panic!("expected TokenRejected, got {:?}", other),
    }
}
