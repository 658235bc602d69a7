#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use scribe::api::AppState;
use scribe::config::Config;
use scribe::domain::Role;
use scribe::models::user::{NewUser, User};
use scribe::state::SharedState;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = Some(JWT_SECRET.to_string());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("scribe-test-{}.db", uuid::Uuid::new_v4()));
    let config = test_config(&db_path);

    let shared = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = scribe::api::create_app_state(shared, Some(handle));
    let app = scribe::api::router(state.clone());

    TestApp {
        app,
        state,
        db_path,
    }
}

impl TestApp {
    pub fn shared(&self) -> &SharedState {
        &self.state.shared
    }

    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        self.shared()
            .user_service
            .register(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: PASSWORD.to_string(),
                role,
            })
            .await
            .expect("Failed to seed user")
    }

    pub async fn token_for(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(auth) = authorization {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Sends a request with an optional bearer token and parses the JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let authorization = token.map(|t| format!("Bearer {t}"));
        let (status, text) = self
            .send_raw(method, uri, authorization.as_deref(), body)
            .await;
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn create_post(&self, token: &str, title: &str, tag: Option<&str>) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/posts",
                Some(token),
                Some(serde_json::json!({
                    "title": title,
                    "content": "Some content that is comfortably long enough.",
                    "tag": tag,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["data"].clone()
    }
}
