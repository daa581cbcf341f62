use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{events, health, sessions};
use crate::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Session routes
        .route("/auth/session", post(sessions::create_session))

        // Event store routes, mirroring the users/{uid}/events tree
        .route("/users/:uid/events", get(events::list_events))
        .route("/users/:uid/events/stream", get(events::stream_events))
        .route(
            "/users/:uid/events/:event_id",
            put(events::put_event).delete(events::delete_event),
        )
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use futures::StreamExt;
    use serde_json::json;
    use shared::api::Session;
    use shared::Snapshot;
    use shared::EventRecord;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::AuthConfig;
    use crate::error::ApiResult;
    use crate::hub::SnapshotHub;
    use crate::repository::{EventRepository, MemoryEventRepository};

    /// Memory repository whose first snapshot read stalls after reading,
    /// until `gate` is opened.
    struct StallingRepository {
        inner: MemoryEventRepository,
        armed: AtomicBool,
        reached: Notify,
        gate: Notify,
    }

    impl StallingRepository {
        fn new() -> Self {
            Self {
                inner: MemoryEventRepository::new(),
                armed: AtomicBool::new(true),
                reached: Notify::new(),
                gate: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl EventRepository for StallingRepository {
        async fn snapshot(&self, uid: &str) -> ApiResult<Snapshot> {
            let snapshot = self.inner.snapshot(uid).await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.reached.notify_one();
                self.gate.notified().await;
            }
            Ok(snapshot)
        }

        async fn put(&self, uid: &str, event_id: &str, record: &EventRecord) -> ApiResult<()> {
            self.inner.put(uid, event_id, record).await
        }

        async fn remove(&self, uid: &str, event_id: &str) -> ApiResult<bool> {
            self.inner.remove(uid, event_id).await
        }
    }

    fn test_state() -> AppState {
        AppState {
            repo: Arc::new(MemoryEventRepository::new()),
            hub: Arc::new(SnapshotHub::new()),
            auth_config: Arc::new(AuthConfig::new("test-secret", 1)),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn sign_in(app: &Router) -> Session {
        let response = send(
            app,
            Request::post("/api/auth/session")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"displayName":"Ada"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_value(body_json(response).await).unwrap()
    }

    fn authed(method: Method, uri: &str, session: &Session, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap()
    }

    fn standup() -> Body {
        Body::from(
            json!({"eventName": "Standup", "eventDate": "2024-06-15", "eventTime": "14:00"})
                .to_string(),
        )
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app(test_state());
        let response = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn session_carries_display_name() {
        let app = app(test_state());
        let session = sign_in(&app).await;
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
        assert!(!session.uid.as_str().is_empty());
    }

    #[tokio::test]
    async fn put_then_list_returns_keyed_snapshot() {
        let app = app(test_state());
        let session = sign_in(&app).await;
        let base = format!("/api/users/{}/events", session.uid);

        let response = send(
            &app,
            authed(Method::PUT, &format!("{base}/1718459200000"), &session, standup()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, authed(Method::GET, &base, &session, Body::empty())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "1718459200000": {
                    "eventName": "Standup",
                    "eventDate": "2024-06-15",
                    "eventTime": "14:00"
                }
            })
        );
    }

    #[tokio::test]
    async fn delete_removes_only_target_and_is_idempotent() {
        let app = app(test_state());
        let session = sign_in(&app).await;
        let base = format!("/api/users/{}/events", session.uid);

        for id in ["1", "2"] {
            send(&app, authed(Method::PUT, &format!("{base}/{id}"), &session, standup())).await;
        }

        for _ in 0..2 {
            let response = send(
                &app,
                authed(Method::DELETE, &format!("{base}/1"), &session, Body::empty()),
            )
            .await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = send(&app, authed(Method::GET, &base, &session, Body::empty())).await;
        let snapshot: Snapshot = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["2"]);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = app(test_state());
        let response = send(
            &app,
            Request::get("/api/users/anyone/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn other_users_collection_is_forbidden() {
        let app = app(test_state());
        let session = sign_in(&app).await;

        let response = send(
            &app,
            authed(
                Method::PUT,
                "/api/users/someone-else/events/1",
                &session,
                standup(),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let app = app(test_state());
        let session = sign_in(&app).await;
        let body = Body::from(
            json!({"eventName": "", "eventDate": "2024-06-15", "eventTime": "14:00"}).to_string(),
        );

        let response = send(
            &app,
            authed(
                Method::PUT,
                &format!("/api/users/{}/events/1", session.uid),
                &session,
                body,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn stream_opens_with_current_snapshot() {
        let state = test_state();
        let app = app(state.clone());
        let session = sign_in(&app).await;
        let base = format!("/api/users/{}/events", session.uid);
        send(&app, authed(Method::PUT, &format!("{base}/7"), &session, standup())).await;

        let response = send(
            &app,
            Request::get(format!("{base}/stream?token={}", session.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.hub.subscriber_count(session.uid.as_str()), 1);

        let mut frames = response.into_body().into_data_stream();
        let first = frames.next().await.unwrap().unwrap();
        let text = String::from_utf8(first.to_vec()).unwrap();
        assert!(text.contains("event: snapshot"), "{text}");
        assert!(text.contains(r#""eventName":"Standup""#), "{text}");
    }

    #[tokio::test]
    async fn overlapping_writes_publish_in_write_order() {
        let repo = Arc::new(StallingRepository::new());
        let state = AppState {
            repo: repo.clone(),
            hub: Arc::new(SnapshotHub::new()),
            auth_config: Arc::new(AuthConfig::new("test-secret", 1)),
        };
        let app = app(state.clone());
        let session = sign_in(&app).await;
        let base = format!("/api/users/{}/events", session.uid);
        let mut stream = state.hub.subscribe(session.uid.as_str());

        let put = |id: &str| {
            let app = app.clone();
            let request = authed(Method::PUT, &format!("{base}/{id}"), &session, standup());
            tokio::spawn(async move { send(&app, request).await.status() })
        };

        // The first write has read its snapshot and is stalled before publishing.
        let first = put("1");
        repo.reached.notified().await;
        let second = put("2");
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        repo.gate.notify_one();

        assert_eq!(first.await.unwrap(), StatusCode::NO_CONTENT);
        assert_eq!(second.await.unwrap(), StatusCode::NO_CONTENT);

        let mut last = None;
        while let Ok(snapshot) = stream.try_recv() {
            last = Some(snapshot);
        }
        let keys: Vec<String> = last.unwrap().into_keys().collect();
        assert_eq!(keys, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn closed_streams_leave_no_channel_behind() {
        let state = test_state();
        let app = app(state.clone());
        let session = sign_in(&app).await;
        let base = format!("/api/users/{}/events", session.uid);

        let response = send(
            &app,
            Request::get(format!("{base}/stream?token={}", session.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.hub.channel_count(), 1);
        drop(response);

        let response = send(&app, authed(Method::PUT, &format!("{base}/1"), &session, standup())).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.hub.channel_count(), 0);
    }
}
