use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use parking_lot::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use ratelimit_cache::MemoryCounterStore;
use ratelimit_core::{
    AppConfig, Error, FixedClock, OverrideFields, OverridePatch, RedisConfig, Result,
    ServerConfig, SupabaseConfig, TierPolicy, User,
};
use ratelimit_database::{OverrideWriter, UserStore};
use ratelimit_server::{AppState, Metrics};

struct FakeUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl FakeUserStore {
    fn new(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }
}

#[async_trait]
impl UserStore for FakeUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().get(&id).cloned())
    }
}

#[async_trait]
impl OverrideWriter for FakeUserStore {
    async fn write(&self, id: Uuid, patch: OverridePatch) -> Result<OverrideFields> {
        let mut users = self.users.lock();
        let user = users.get_mut(&id).ok_or_else(|| Error::not_found(id.to_string()))?;
        let mut fields = OverrideFields {
            override_limit: user.override_.map(|o| o.limit),
            override_window_seconds: user.override_.map(|o| o.window_seconds),
            override_expiry: user.override_.map(|o| o.expiry),
        };
        if let Some(limit) = patch.override_limit {
            fields.override_limit = Some(limit);
        }
        if let Some(window) = patch.override_window_seconds {
            fields.override_window_seconds = Some(window);
        }
        if let Some(expiry) = patch.override_expiry {
            fields.override_expiry = Some(expiry);
        }
        Ok(fields)
    }
}

fn free_user(id: Uuid) -> User {
    User {
        id,
        tier: "free".to_string(),
        override_: None,
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        redis: RedisConfig::default(),
        supabase: SupabaseConfig {
            url: "https://example.supabase.co".to_string(),
            service_role_key: "test-key".to_string(),
        },
        tier_policy: TierPolicy::default(),
    }
}

fn build_app(users: Vec<User>) -> axum::Router {
    let user_store: Arc<FakeUserStore> = Arc::new(FakeUserStore::new(users));
    let state = AppState::builder()
        .config(test_config())
        .user_store(user_store.clone())
        .override_writer(user_store)
        .counter_store(Arc::new(MemoryCounterStore::new()))
        .clock(Arc::new(FixedClock::new(chrono::Utc::now())))
        .metrics(Arc::new(Metrics::new()))
        .build()
        .expect("state should build");
    ratelimit_server::create_router(state)
}

#[tokio::test]
async fn check_allows_requests_within_the_free_tier_limit() {
    let id = Uuid::new_v4();
    let app = build_app(vec![free_user(id)]);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/check?userId={id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ALLOWED");
}

#[tokio::test]
async fn check_rejects_the_request_that_exceeds_the_limit() {
    let id = Uuid::new_v4();
    let user_store: Arc<FakeUserStore> = Arc::new(FakeUserStore::new(vec![free_user(id)]));
    let state = AppState::builder()
        .config(test_config())
        .user_store(user_store.clone())
        .override_writer(user_store)
        .counter_store(Arc::new(MemoryCounterStore::new()))
        .clock(Arc::new(FixedClock::new(chrono::Utc::now())))
        .metrics(Arc::new(Metrics::new()))
        .build()
        .unwrap();
    let app = ratelimit_server::create_router(state);

    // free tier default is 10 requests per window; exhaust it.
    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/check?userId={id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/check?userId={id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
}

#[tokio::test]
async fn check_returns_404_for_an_unknown_user() {
    let app = build_app(vec![]);
    let id = Uuid::new_v4();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/check?userId={id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn check_returns_400_for_a_malformed_user_id() {
    let app = build_app(vec![]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/check?userId=not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn override_write_updates_and_returns_the_patched_fields() {
    let id = Uuid::new_v4();
    let app = build_app(vec![free_user(id)]);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/users/{id}/rate-limits"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"overrideLimit": 500, "overrideWindowSeconds": 60, "overrideExpiry": "2099-01-01T00:00:00Z"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["updated"]["overrideLimit"], 500);
}

#[tokio::test]
async fn override_write_rejects_unknown_body_fields() {
    let id = Uuid::new_v4();
    let app = build_app(vec![free_user(id)]);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/users/{id}/rate-limits"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"notAField": 1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn override_write_rejects_malformed_json() {
    let id = Uuid::new_v4();
    let app = build_app(vec![free_user(id)]);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/users/{id}/rate-limits"))
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_returns_ok() {
    let app = build_app(vec![]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
