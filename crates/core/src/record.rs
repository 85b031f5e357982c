//! Image pool records and dataset source resolution.
//!
//! The pool mixes two datasets with different coordinate conventions.
//! [`DatasetSource`] is resolved from the record path at the boundary and
//! carried explicitly; raw coordinates are never interpreted without it.

use serde::{Deserialize, Serialize};

/// Coordinate convention of a source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    /// GazeFollow: bbox/eye/gaze already normalized to [0,1].
    GazeFollow,
    /// VAT: pixel coordinates, with `-1` marking an out-of-frame value.
    Vat,
}

impl DatasetSource {
    /// Whether coordinates from this source are already in [0,1].
    pub fn is_normalized(self) -> bool {
        matches!(self, Self::GazeFollow)
    }
}

/// One image in the annotation pool, as loaded from the combined dataset
/// index.
///
/// Immutable once loaded. Coordinate lists are kept loose (`Vec<f64>`)
/// because the index files are produced by external conversion scripts;
/// the normalizer falls back to defaults on short or malformed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Dataset-relative path; its prefix decides the source dataset.
    pub path: String,
    /// Head bounding box `[x, y, w, h]`.
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    /// Eye position `[x, y]`.
    #[serde(default)]
    pub eye: Option<Vec<f64>>,
    /// Gaze target `[x, y]`.
    #[serde(default)]
    pub gaze: Option<Vec<f64>>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "image".to_string()
}

impl ImageRecord {
    /// Resolve the source dataset from the path prefix convention:
    /// `train/…` and `test2/…` are GazeFollow, everything else is VAT.
    pub fn source(&self) -> DatasetSource {
        if self.path.starts_with("train/") || self.path.starts_with("test2/") {
            DatasetSource::GazeFollow
        } else {
            DatasetSource::Vat
        }
    }

    /// Basename of `path`. VAT records are located on disk by filename.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}
