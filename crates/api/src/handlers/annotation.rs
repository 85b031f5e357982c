//! Annotation persistence handlers.
//!
//! Both endpoints resolve the session's entry index for the addressed
//! workset slot (allocating on first write) and go through the store's
//! serialized read-modify-write path.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use gazelab_core::annotation::{validate_gaze3d, AnnotationRecord};
use gazelab_core::types::EntryIndex;

use crate::error::AppResult;
use crate::handlers::workset::slot;
use crate::middleware::session::Annotator;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaveOutcome {
    /// Entry index the annotations were stored under.
    pub index: EntryIndex,
    /// Number of annotation records written.
    pub saved: usize,
    /// Position clients should advance to, clamped at the last image.
    pub next_position: usize,
}

/// POST /workset/{position}/annotations
///
/// Full-replace upsert of the annotation list for one workset slot.
/// Last write wins per entry.
pub async fn save_annotations(
    annotator: Annotator,
    State(state): State<AppState>,
    Path(position): Path<usize>,
    Json(mut annotations): Json<Vec<AnnotationRecord>>,
) -> AppResult<(StatusCode, Json<DataResponse<SaveOutcome>>)> {
    let workset = state.sessions.resolve(&annotator.id);
    let image = slot(&workset, position)?;

    // Stamp the image identity onto records that lack it; the merge
    // engine groups by this key.
    for ann in &mut annotations {
        if ann.image_path.is_none() {
            ann.image_path = Some(image.record.path.clone());
        }
    }

    let index = state.store.allocate_index(&annotator.id, position)?;
    let saved = annotations.len();
    state.store.upsert_annotations(index, annotations)?;

    tracing::info!(
        identity = %annotator.id,
        position,
        index,
        saved,
        "Annotations saved"
    );

    let next_position = (position + 1).min(workset.len().saturating_sub(1));
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SaveOutcome {
                index,
                saved,
                next_position,
            },
        }),
    ))
}

/// Body for the 3D gaze field upsert. Uppercase aliases match the
/// original client payloads.
#[derive(Debug, Deserialize)]
pub struct Gaze3dPayload {
    #[serde(alias = "X")]
    pub x: f64,
    #[serde(alias = "Y")]
    pub y: f64,
    #[serde(alias = "Z")]
    pub z: f64,
    /// Position inside the entry's annotation list; append when absent
    /// or out of range.
    #[serde(default)]
    pub annotation_idx: Option<usize>,
    #[serde(default)]
    pub gaze_number: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Gaze3dOutcome {
    pub index: EntryIndex,
    pub annotation_idx: Option<usize>,
    pub gaze_3d: [f64; 3],
}

/// POST /workset/{position}/gaze3d
///
/// Field-level upsert of a 3D gaze vector (camera coordinates) for one
/// workset slot, with the store's append fallback when the addressed
/// annotation does not exist.
pub async fn save_gaze3d(
    annotator: Annotator,
    State(state): State<AppState>,
    Path(position): Path<usize>,
    Json(payload): Json<Gaze3dPayload>,
) -> AppResult<Json<DataResponse<Gaze3dOutcome>>> {
    let workset = state.sessions.resolve(&annotator.id);
    slot(&workset, position)?;

    validate_gaze3d(payload.x, payload.y, payload.z)?;
    let gaze_3d = [payload.x, payload.y, payload.z];

    let index = state.store.allocate_index(&annotator.id, position)?;
    state
        .store
        .upsert_gaze3d(index, payload.annotation_idx, gaze_3d, payload.gaze_number)?;

    tracing::info!(
        identity = %annotator.id,
        position,
        index,
        annotation_idx = ?payload.annotation_idx,
        "3D gaze saved"
    );

    Ok(Json(DataResponse {
        data: Gaze3dOutcome {
            index,
            annotation_idx: payload.annotation_idx,
            gaze_3d,
        },
    }))
}
