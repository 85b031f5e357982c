//! Image file serving.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use gazelab_store::StoreError;

use crate::error::{AppError, AppResult};
use crate::handlers::workset::slot;
use crate::middleware::session::Annotator;
use crate::state::AppState;

/// GET /images/{position}
///
/// Serve the backing file for one workset slot. Both source datasets
/// ship JPEGs, so the content type is fixed.
pub async fn serve_image(
    annotator: Annotator,
    State(state): State<AppState>,
    Path(position): Path<usize>,
) -> AppResult<impl IntoResponse> {
    let workset = state.sessions.resolve(&annotator.id);
    let image = slot(&workset, position)?;

    let bytes = tokio::fs::read(&image.file).await.map_err(|e| {
        AppError::Store(StoreError::Io {
            path: image.file.clone(),
            source: e,
        })
    })?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
