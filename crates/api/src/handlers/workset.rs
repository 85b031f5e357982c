//! Session workset handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use gazelab_core::error::CoreError;
use gazelab_core::record::ImageRecord;
use gazelab_store::pool::PoolImage;

use crate::error::{AppError, AppResult};
use crate::middleware::session::Annotator;
use crate::response::DataResponse;
use crate::state::AppState;

/// One workset slot as returned to clients.
#[derive(Debug, Serialize)]
pub struct WorksetImage {
    pub position: usize,
    #[serde(flatten)]
    pub record: ImageRecord,
}

/// Progress wrapper for a single slot.
#[derive(Debug, Serialize)]
pub struct WorksetSlot {
    pub position: usize,
    pub total: usize,
    #[serde(flatten)]
    pub record: ImageRecord,
}

/// GET /workset
///
/// Resolve (or bind) this session's workset and list it in order.
pub async fn list_workset(
    annotator: Annotator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<WorksetImage>>>> {
    let workset = state.sessions.resolve(&annotator.id);
    let images = workset
        .iter()
        .enumerate()
        .map(|(position, image)| WorksetImage {
            position,
            record: image.record.clone(),
        })
        .collect();
    Ok(Json(DataResponse { data: images }))
}

/// GET /workset/{position}
///
/// One workset slot plus progress information.
pub async fn get_workset_image(
    annotator: Annotator,
    State(state): State<AppState>,
    Path(position): Path<usize>,
) -> AppResult<Json<DataResponse<WorksetSlot>>> {
    let workset = state.sessions.resolve(&annotator.id);
    let image = slot(&workset, position)?;
    Ok(Json(DataResponse {
        data: WorksetSlot {
            position,
            total: workset.len(),
            record: image.record.clone(),
        },
    }))
}

/// Fetch a workset slot, mapping an out-of-range position to a
/// validation error (the contract is a 400, not a 404: the position is
/// client input, not a resource id).
pub(crate) fn slot(workset: &[PoolImage], position: usize) -> Result<&PoolImage, AppError> {
    workset.get(position).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "position {position} out of range (workset has {} images)",
            workset.len()
        )))
    })
}
