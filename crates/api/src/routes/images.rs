//! Image serving route, kept at the root level (not under `/api/v1`) so
//! `<img>` tags can reference it directly.

use axum::routing::get;
use axum::Router;

use crate::handlers::image;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/images/{position}", get(image::serve_image))
}
