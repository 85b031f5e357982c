//! Annotation records and store entries.
//!
//! An [`AnnotationEntry`] is the store's unit of persistence, keyed by a
//! globally unique index. Each entry holds the [`AnnotationRecord`]s one
//! session produced for one image. Records come from heterogeneous
//! clients, so unknown keys are preserved round-trip; field-level schema
//! validation is deliberately out of scope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::EntryIndex;

/// One person's gaze label inside an entry.
///
/// `bbox`/`gaze`/`gaze_3d` serialize as explicit `null` when absent
/// (matching the wire shape clients produce); the optional metadata
/// fields are omitted entirely when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Face bounding box `[x, y, w, h]`, normalized.
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    /// Gaze target point `[x, y]`, normalized.
    #[serde(default)]
    pub gaze: Option<Vec<f64>>,
    /// Gaze target in camera coordinates `[x, y, z]`.
    #[serde(default)]
    pub gaze_3d: Option<[f64; 3]>,
    /// 1-based label shown next to the drawn box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze_number: Option<i64>,
    /// Categorical judgment: in-frame / out-of-frame / eye-contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Categorical judgment: farther / closer / equal / not sure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farther_closer: Option<String>,
    /// Estimated gaze distance (free text, e.g. meters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    /// What the person is looking at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_detection: Option<String>,
    /// Image identity key used by the merge engine for grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Stamped by the merge engine from the source document's filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotator_id: Option<String>,
    /// Keys this schema does not know about survive a round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotationRecord {
    /// Minimal record carrying only the given field (the append-fallback
    /// path for late field-level updates).
    pub fn with_field(field: &str, value: Value) -> Result<Self, CoreError> {
        let mut record = Self::default();
        record.set_field(field, value)?;
        Ok(record)
    }

    /// Set one named field, deserializing into the typed slot when the
    /// name is known and into the extras map otherwise.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<(), CoreError> {
        match field {
            "bbox" => self.bbox = parse_field(field, value)?,
            "gaze" => self.gaze = parse_field(field, value)?,
            "gaze_3d" => self.gaze_3d = parse_field(field, value)?,
            "gaze_number" => self.gaze_number = parse_field(field, value)?,
            "target_type" => self.target_type = parse_field(field, value)?,
            "farther_closer" => self.farther_closer = parse_field(field, value)?,
            "scale" => self.scale = parse_field(field, value)?,
            "object_detection" => self.object_detection = parse_field(field, value)?,
            "image_path" => self.image_path = parse_field(field, value)?,
            "annotator_id" => self.annotator_id = parse_field(field, value)?,
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }
}

fn parse_field<T: serde::de::DeserializeOwned>(
    field: &str,
    value: Value,
) -> Result<T, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::Validation(format!("Invalid value for field '{field}': {e}")))
}

/// The store's unit of persistence.
///
/// `index` is globally unique within one document. `image_path` is set
/// only by the merge engine; consumers must treat it as optional
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    #[serde(default)]
    pub index: EntryIndex,
    #[serde(default)]
    pub annotations: Vec<AnnotationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl AnnotationEntry {
    /// Empty entry for a freshly allocated index.
    pub fn new(index: EntryIndex) -> Self {
        Self {
            index,
            annotations: Vec::new(),
            image_path: None,
        }
    }
}

/// Validate a 3D gaze vector: all components must be finite numbers.
pub fn validate_gaze3d(x: f64, y: f64, z: f64) -> Result<(), CoreError> {
    for (name, v) in [("x", x), ("y", y), ("z", z)] {
        if v.is_nan() || v.is_infinite() {
            return Err(CoreError::Validation(format!(
                "gaze_3d component '{name}' must be a finite number, got {v}"
            )));
        }
    }
    Ok(())
}
