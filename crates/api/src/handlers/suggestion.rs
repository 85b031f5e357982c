//! Gaze suggestion handler.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use gazelab_core::suggest::{suggest, GazeSuggestion};
use gazelab_store::pool;

use crate::error::AppResult;
use crate::handlers::workset::slot;
use crate::middleware::session::Annotator;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub position: usize,
    #[serde(flatten)]
    pub suggestion: GazeSuggestion,
    pub source: &'static str,
}

/// GET /workset/{position}/suggestion
///
/// Normalize the slot's dataset ground truth into a drawing suggestion.
/// The store is never involved; a missing or corrupt image file is a
/// resource error, normalization itself cannot fail.
pub async fn gaze_suggestion(
    annotator: Annotator,
    State(state): State<AppState>,
    Path(position): Path<usize>,
) -> AppResult<Json<DataResponse<SuggestionResponse>>> {
    let workset = state.sessions.resolve(&annotator.id);
    let image = slot(&workset, position)?;

    let (width, height) = pool::image_dimensions(&image.file)?;
    let suggestion = suggest(&image.record, width, height);

    Ok(Json(DataResponse {
        data: SuggestionResponse {
            position,
            suggestion,
            source: "dataset",
        },
    }))
}
