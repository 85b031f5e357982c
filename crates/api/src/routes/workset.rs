//! Route definitions for session worksets and annotation persistence.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{annotation, suggestion, workset};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/workset", get(workset::list_workset))
        .route("/workset/{position}", get(workset::get_workset_image))
        .route(
            "/workset/{position}/annotations",
            post(annotation::save_annotations),
        )
        .route("/workset/{position}/gaze3d", post(annotation::save_gaze3d))
        .route(
            "/workset/{position}/suggestion",
            get(suggestion::gaze_suggestion),
        )
}
