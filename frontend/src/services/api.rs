use async_trait::async_trait;
use futures::channel::oneshot;
use futures::StreamExt;
use gloo_net::eventsource::futures::EventSource;
use gloo_net::http::{Request, RequestBuilder, Response};
use shared::api::{ErrorResponse, SNAPSHOT_EVENT};
use shared::store::{EventStore, SnapshotListener, StoreError, Subscription};
use shared::{EventRecord, Snapshot, StorePath};
use wasm_bindgen_futures::spawn_local;

use super::auth::load_session;

pub const API_BASE_URL: &str = "/api";

/// Event store served by the backend's `/api/users/...` tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HttpEventStore;

impl HttpEventStore {
    fn url(path: &StorePath) -> String {
        format!("{}/{}", API_BASE_URL, path)
    }

    fn authorize(request: RequestBuilder) -> RequestBuilder {
        match load_session() {
            Some(session) => request.header("Authorization", &format!("Bearer {}", session.token)),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        if response.ok() {
            Ok(response)
        } else {
            Err(StoreError::Rejected {
                status: response.status(),
                message: error_message(&response).await,
            })
        }
    }
}

#[async_trait(?Send)]
impl EventStore for HttpEventStore {
    async fn read(&self, collection: &StorePath) -> Result<Snapshot, StoreError> {
        let response = Self::authorize(Request::get(&Self::url(collection)))
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{:?}", e)))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("{:?}", e)))
    }

    async fn write(&self, path: &StorePath, record: &EventRecord) -> Result<(), StoreError> {
        let response = Self::authorize(Request::put(&Self::url(path)))
            .json(record)
            .map_err(|e| StoreError::Decode(format!("Failed to serialize record: {:?}", e)))?
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{:?}", e)))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        let response = Self::authorize(Request::delete(&Self::url(path)))
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{:?}", e)))?;

        Self::check(response).await?;
        Ok(())
    }

    fn subscribe(
        &self,
        collection: &StorePath,
        listener: SnapshotListener,
    ) -> Result<Subscription, StoreError> {
        let session = load_session()
            .ok_or_else(|| StoreError::Subscribe("No session token".to_string()))?;
        let url = format!("{}/stream?token={}", Self::url(collection), session.token);

        let mut source =
            EventSource::new(&url).map_err(|e| StoreError::Subscribe(format!("{:?}", e)))?;
        let frames = source
            .subscribe(SNAPSHOT_EVENT)
            .map_err(|e| StoreError::Subscribe(format!("{:?}", e)))?;

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let mut frames = frames.take_until(cancel_rx);

        spawn_local(async move {
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok((_, message)) => {
                        let Some(data) = message.data().as_string() else {
                            tracing::warn!("Snapshot frame without text payload");
                            continue;
                        };
                        match serde_json::from_str::<Snapshot>(&data) {
                            Ok(snapshot) => listener(snapshot),
                            Err(e) => tracing::error!("Failed to parse snapshot: {}", e),
                        }
                    }
                    // The browser reconnects on its own; keep listening.
                    Err(e) => tracing::warn!("Event stream error: {:?}", e),
                }
            }
            tracing::debug!("Event stream closed");
        });

        Ok(Subscription::new(move || {
            drop(cancel_tx);
            source.close();
        }))
    }
}

/// Best-effort human-readable message from an error response.
pub async fn error_message(response: &Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => format!("HTTP error: {}", status),
    }
}
