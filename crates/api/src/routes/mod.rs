pub mod health;
pub mod images;
pub mod workset;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// GET  /workset                          resolve session workset (list)
/// GET  /workset/{position}               one slot + progress
/// POST /workset/{position}/annotations   full-replace annotation upsert
/// POST /workset/{position}/gaze3d        3D gaze field upsert
/// GET  /workset/{position}/suggestion    normalized drawing suggestion
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(workset::router())
}
