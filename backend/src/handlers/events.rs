use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use shared::api::SNAPSHOT_EVENT;
use shared::{EventRecord, Snapshot};
use tokio::sync::broadcast::{self, error::RecvError};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::repository::EventRepository;
use crate::AppState;

const MAX_EVENT_ID_LEN: usize = 64;

pub async fn list_events(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<Snapshot>> {
    user.ensure_owner(&uid)?;

    let snapshot = state.repo.snapshot(&uid).await?;
    Ok(Json(snapshot))
}

pub async fn put_event(
    State(state): State<AppState>,
    Path((uid, event_id)): Path<(String, String)>,
    user: AuthUser,
    Json(record): Json<EventRecord>,
) -> ApiResult<StatusCode> {
    user.ensure_owner(&uid)?;
    validate_event_id(&event_id)?;
    record.validate()?;

    let _write = state.hub.write_lock(&uid).await;
    state.repo.put(&uid, &event_id, &record).await?;
    tracing::info!(%uid, %event_id, name = ?user.name, "Stored event");

    publish_snapshot(&state, &uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path((uid, event_id)): Path<(String, String)>,
    user: AuthUser,
) -> ApiResult<StatusCode> {
    user.ensure_owner(&uid)?;

    let _write = state.hub.write_lock(&uid).await;
    if state.repo.remove(&uid, &event_id).await? {
        tracing::info!(%uid, %event_id, "Removed event");
        publish_snapshot(&state, &uid).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Live feed of the user's collection. The first frame is the current
/// snapshot; every later frame is the complete collection after a change.
pub async fn stream_events(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    user: AuthUser,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    user.ensure_owner(&uid)?;

    // Subscribe before the initial read so no change falls in between.
    let receiver = state.hub.subscribe(&uid);
    let initial = state.repo.snapshot(&uid).await?;
    tracing::debug!(%uid, "Opened event stream");

    let stream = snapshot_stream(initial, receiver, state.repo.clone(), uid);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn validate_event_id(event_id: &str) -> ApiResult<()> {
    if event_id.is_empty() || event_id.len() > MAX_EVENT_ID_LEN {
        return Err(ApiError::bad_request(format!(
            "Event id must be 1 to {} characters",
            MAX_EVENT_ID_LEN
        )));
    }
    Ok(())
}

/// Push `uid`'s current collection to its open streams. Callers hold the
/// user's write lock so publishes follow write order.
async fn publish_snapshot(state: &AppState, uid: &str) -> ApiResult<()> {
    if state.hub.subscriber_count(uid) == 0 {
        return Ok(());
    }
    let snapshot = state.repo.snapshot(uid).await?;
    let delivered = state.hub.publish(uid, snapshot);
    tracing::debug!(%uid, delivered, "Published snapshot");
    Ok(())
}

fn snapshot_frame(snapshot: &Snapshot) -> SseEvent {
    SseEvent::default()
        .event(SNAPSHOT_EVENT)
        .json_data(snapshot)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to encode snapshot: {}", e);
            SseEvent::default().comment("snapshot encoding failed")
        })
}

struct StreamState {
    pending: Option<Snapshot>,
    receiver: broadcast::Receiver<Snapshot>,
    repo: Arc<dyn EventRepository>,
    uid: String,
}

fn snapshot_stream(
    initial: Snapshot,
    receiver: broadcast::Receiver<Snapshot>,
    repo: Arc<dyn EventRepository>,
    uid: String,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    let state = StreamState {
        pending: Some(initial),
        receiver,
        repo,
        uid,
    };

    stream::unfold(state, |mut state| async move {
        if let Some(snapshot) = state.pending.take() {
            return Some((Ok(snapshot_frame(&snapshot)), state));
        }

        loop {
            match state.receiver.recv().await {
                Ok(snapshot) => return Some((Ok(snapshot_frame(&snapshot)), state)),
                Err(RecvError::Lagged(skipped)) => {
                    // Older snapshots are superseded; send the current one.
                    tracing::warn!(uid = %state.uid, skipped, "Event stream lagged");
                    match state.repo.snapshot(&state.uid).await {
                        Ok(snapshot) => return Some((Ok(snapshot_frame(&snapshot)), state)),
                        Err(e) => tracing::error!(uid = %state.uid, "Failed to reload snapshot: {}", e),
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
