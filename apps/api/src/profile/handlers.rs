//! HTTP handlers for profiles: load, save, sync and the live stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::errors::AppError;
use crate::models::profile::{now_ms, UserProfile};
use crate::profile::SyncAction;
use crate::state::AppState;

const STREAM_KEEP_ALIVE: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub uid: String,
    pub action: SyncAction,
}

/// GET /api/v1/profiles/:uid
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.profiles.load(&uid).await?))
}

/// PUT /api/v1/profiles/:uid
pub async fn handle_put_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserProfile {
        uid,
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        bio: req.bio,
        skills: req.skills,
        experience: req.experience,
        last_updated: now_ms(),
    };
    state.profiles.save(&profile).await?;
    Ok(Json(profile))
}

/// POST /api/v1/profiles/:uid/sync
pub async fn handle_sync_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<SyncResponse>, AppError> {
    let action = state.profiles.sync(&uid).await?;
    Ok(Json(SyncResponse { uid, action }))
}

/// GET /api/v1/profiles/:uid/stream
///
/// Server-sent events: one `profile` event with the cached copy on connect and
/// another after every local write. Nothing is sent while the cache is empty.
pub async fn handle_profile_stream(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let subscription = state.profiles.watch(&uid).await?;
    let events = subscription.into_stream().filter_map(|profile| {
        let profile = profile?;
        match Event::default().event("profile").json_data(&profile) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!("Could not encode profile {} for streaming: {e}", profile.uid);
                None
            }
        }
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(STREAM_KEEP_ALIVE)))
}
