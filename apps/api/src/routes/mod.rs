pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::enhance::handlers as enhance;
use crate::profile::handlers as profiles;
use crate::render::handlers as render;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/api/v1/profiles/:uid",
            get(profiles::handle_get_profile).put(profiles::handle_put_profile),
        )
        .route(
            "/api/v1/profiles/:uid/sync",
            post(profiles::handle_sync_profile),
        )
        .route(
            "/api/v1/profiles/:uid/stream",
            get(profiles::handle_profile_stream),
        )
        // Resumes
        .route("/api/v1/templates", get(resumes::handle_list_templates))
        .route(
            "/api/v1/users/:uid/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/title",
            patch(resumes::handle_rename_resume),
        )
        // Rendering
        .route("/api/v1/resumes/:id/pdf", get(render::handle_download_pdf))
        .route(
            "/api/v1/resumes/:id/export",
            post(render::handle_export_pdf),
        )
        .route(
            "/api/v1/resumes/:id/layout",
            get(render::handle_layout_preview),
        )
        // Enhancement
        .route(
            "/api/v1/enhance/summary",
            post(enhance::handle_improve_summary),
        )
        .route(
            "/api/v1/resumes/:id/enhance",
            post(enhance::handle_improve_resume),
        )
        .with_state(state)
}
