use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use url::Url;

use caregate_api::app::{build_app_with, services::seed_demo_identities, services::DemoIdentities};
use caregate_auth::strategies::{FederatedProfileSource, FederationError, ProfileValue, RawFederatedProfile};
use caregate_auth::{TokenClaims, UserType};
use caregate_core::SubjectId;
use caregate_infra::{AppConfig, InMemoryIdentityStore};

const JWT_SECRET: &str = "black-box-secret";
const ADMIN_TOKEN: &str = "black-box-admin-token";

struct FakeGoogle;

#[async_trait]
impl FederatedProfileSource for FakeGoogle {
    fn authorization_url(&self) -> Url {
        Url::parse("https://accounts.example.test/o/oauth2/auth?client_id=test").unwrap()
    }

    async fn fetch_profile(&self, code: &str) -> Result<RawFederatedProfile, FederationError> {
        if code != "good-code" {
            return Err(FederationError::CodeExchange("invalid_grant".to_string()));
        }
        Ok(RawFederatedProfile {
            id: "google-123".to_string(),
            display_name: Some("Nina Nutri".to_string()),
            emails: vec![ProfileValue {
                value: "nina@example.test".to_string(),
            }],
            ..RawFederatedProfile::default()
        })
    }
}

struct TestServer {
    base_url: String,
    ids: DemoIdentities,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(google: bool) -> Self {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("AUTH_JWT_SECRET", JWT_SECRET),
            ("SECRET_ADMIN_ACCESS_TOKEN", ADMIN_TOKEN),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        let identities = Arc::new(InMemoryIdentityStore::new());
        let ids = seed_demo_identities(&identities).unwrap();

        let source = google.then(|| Arc::new(FakeGoogle) as Arc<dyn FederatedProfileSource>);
        let app = build_app_with(config, identities, source).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, ids, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(sub: &str, user_type: Option<UserType>) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: sub.to_string(),
        user_type,
        iat: Some(now.timestamp()),
        exp: (now + ChronoDuration::minutes(10)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn(false).await;

    let res = reqwest::get(format!("{}/health", server.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn whoami_requires_a_bearer_token() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let res = client
        .get(server.url("/whoami"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_returns_the_hydrated_identity() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(&server.ids.nutritionist.to_string(), None);

    let res = client.get(server.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], server.ids.nutritionist.to_string());
    assert_eq!(body["user_type"], "NUTRITIONIST");
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["authentication"]["strategy"], "jwt");
    assert!(body["permissions"]
        .as_array()
        .unwrap()
        .contains(&json!("nutritionists:manage")));
}

#[tokio::test]
async fn unknown_subject_is_rejected() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(&SubjectId::new().to_string(), None);

    let res = client.get(server.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responsable_user_type_selects_the_responsable_store() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let token = mint_jwt(&server.ids.responsable.to_string(), Some(UserType::Responsable));
    let res = client.get(server.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user_type"], "RESPONSABLE");

    // Without the claim the professional store is consulted, which does not know this subject.
    let token = mint_jwt(&server.ids.responsable.to_string(), None);
    let res = client.get(server.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn policies_gate_handlers() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();
    let responsable = mint_jwt(&server.ids.responsable.to_string(), Some(UserType::Responsable));
    let admin = mint_jwt(&server.ids.admin.to_string(), None);

    let res = client
        .get(server.url("/patients"))
        .bearer_auth(&responsable)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(server.url("/financials/f-1"))
        .bearer_auth(&responsable)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(server.url("/financials/f-1"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn admin_routes_require_the_admin_token() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/admin/configs"))
        .header("x-custom-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/admin/configs"))
        .header("x-custom-token", "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(server.url("/admin/configs"))
        .header("x-custom-token", ADMIN_TOKEN)
        .json(&json!({ "maintenance": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["settings"]["maintenance"], true);
}

#[tokio::test]
async fn head_requests_follow_the_get_route_guards() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();
    let responsable = mint_jwt(&server.ids.responsable.to_string(), Some(UserType::Responsable));

    let res = client
        .head(server.url("/admin/configs"))
        .bearer_auth(&responsable)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .head(server.url("/admin/configs"))
        .header("x-custom-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.head(format!("{}/health", server.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.head(server.url("/patients")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn custom_token_mismatch_is_unauthorized() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/internal/cache/flush"))
        .header("x-custom-token", "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url("/internal/cache/flush"))
        .header("x-custom-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn passkey_sign_in_attaches_the_body() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/auth/sign-in/passkey"))
        .json(&json!({ "credentialId": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["authentication"]["strategy"], "passkey");
    assert_eq!(body["authentication"]["principal"]["credentialId"], "abc");
}

#[tokio::test]
async fn google_callback_exchanges_the_code() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/auth/sign-in/oauth/google/callback?code=good-code"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["authentication"]["strategy"], "oauth");
    assert_eq!(body["authentication"]["principal"]["email"], "nina@example.test");

    let res = client
        .get(server.url("/auth/sign-in/oauth/google/callback"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/auth/sign-in/oauth/google/callback?code=bad"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn google_sign_in_redirects_when_configured() {
    let configured = TestServer::spawn(true).await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let res = client
        .get(configured.url("/auth/sign-in/oauth/google"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = res.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("https://accounts.example.test/"));

    let unconfigured = TestServer::spawn(false).await;
    let res = client
        .get(unconfigured.url("/auth/sign-in/oauth/google"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn explain_reports_why_access_is_denied() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();
    let token = mint_jwt(&server.ids.responsable.to_string(), Some(UserType::Responsable));

    let res = client
        .get(server.url("/me/abilities/explain?action=delete&resource=financials"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["granted"], false);
    assert!(!body["suggestions"].as_array().unwrap().is_empty());

    let res = client
        .get(server.url("/me/abilities/explain?action=fly&resource=financials"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
