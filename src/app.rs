use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

/// Upper bound on an uploaded photo body.
const PHOTO_BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/records/:name",
            get(handlers::get_record)
                .put(handlers::put_record)
                .delete(handlers::delete_record),
        )
        .route("/api/checklists/:name/toggle", post(handlers::toggle_checklist))
        .route("/api/checklists/:name/reset", post(handlers::reset_checklist))
        .route("/api/checkin", get(handlers::get_checkin))
        .route("/api/checkin/:day/toggle", post(handlers::toggle_checkin))
        .route("/api/supplements/:id/toggle", post(handlers::toggle_supplement))
        .route("/api/goals/personal", put(handlers::put_personal_goal))
        .route(
            "/api/photos",
            get(handlers::list_photos)
                .post(handlers::upload_photo)
                .layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        .route("/api/photos/navigate", get(handlers::navigate_photos))
        .route("/api/photos/:id", delete(handlers::delete_photo))
        .route("/api/progress", get(handlers::get_progress))
        .with_state(state)
}
