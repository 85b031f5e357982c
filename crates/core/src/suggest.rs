//! Gaze suggestion normalizer.
//!
//! Converts dataset ground truth (two coordinate conventions) into one
//! normalized drawing suggestion. Pure and fail-soft: malformed input
//! degrades to the documented defaults rather than failing the request —
//! suggestions are hints, not the system of record.

use serde::Serialize;

use crate::record::{DatasetSource, ImageRecord};

/// Fallback box when a record has no usable bbox: centered, half-size.
pub const DEFAULT_BBOX: [f64; 4] = [0.25, 0.25, 0.5, 0.5];

/// Fallback point when a record has no usable point: the image center.
pub const DEFAULT_POINT: [f64; 2] = [0.5, 0.5];

/// Normalized stand-in for a pixel coordinate marked out of frame.
/// Small and negative so consumers can tell "off the edge" from 0.0.
pub const OUT_OF_FRAME: f64 = -0.05;

/// A normalized drawing suggestion derived from dataset metadata.
///
/// `bbox` fields are clamped to [0,1]; points are not clamped, so the
/// out-of-frame sentinel survives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GazeSuggestion {
    pub bbox: [f64; 4],
    pub eye: [f64; 2],
    pub gaze: [f64; 2],
}

/// Rectify a bounding box so width/height are non-negative, shifting the
/// origin by any negative extent.
pub fn rectify_bbox(x: f64, y: f64, w: f64, h: f64) -> (f64, f64, f64, f64) {
    let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
    let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
    (x, y, w, h)
}

fn clamp01(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Normalize a bounding box to [0,1] coordinates.
///
/// Pixel boxes divide by the image dimensions; short, missing or
/// non-finite input yields [`DEFAULT_BBOX`].
pub fn normalize_bbox(
    bbox: Option<&[f64]>,
    source: DatasetSource,
    width: u32,
    height: u32,
) -> [f64; 4] {
    let Some(b) = bbox else {
        return DEFAULT_BBOX;
    };
    if b.len() < 4 || b[..4].iter().any(|v| !v.is_finite()) {
        return DEFAULT_BBOX;
    }

    let (mut x, mut y, mut w, mut h) = rectify_bbox(b[0], b[1], b[2], b[3]);
    if !source.is_normalized() {
        x /= f64::from(width);
        y /= f64::from(height);
        w /= f64::from(width);
        h /= f64::from(height);
    }
    [clamp01(x), clamp01(y), clamp01(w), clamp01(h)]
}

/// Normalize a point to [0,1] coordinates.
///
/// A negative pixel coordinate encodes "out of frame" and maps to
/// [`OUT_OF_FRAME`] instead of being scaled; the result is deliberately
/// left unclamped. Short or unparsable input yields [`DEFAULT_POINT`].
pub fn normalize_point(
    pt: Option<&[f64]>,
    source: DatasetSource,
    width: u32,
    height: u32,
) -> [f64; 2] {
    let Some(p) = pt else {
        return DEFAULT_POINT;
    };
    if p.len() < 2 || !p[0].is_finite() || !p[1].is_finite() {
        return DEFAULT_POINT;
    }
    if source.is_normalized() {
        return [p[0], p[1]];
    }

    let nx = if p[0] >= 0.0 { p[0] / f64::from(width) } else { OUT_OF_FRAME };
    let ny = if p[1] >= 0.0 { p[1] / f64::from(height) } else { OUT_OF_FRAME };
    [nx, ny]
}

/// Build a drawing suggestion for one pool record.
///
/// Records without an explicit gaze target fall back to the eye point.
pub fn suggest(record: &ImageRecord, width: u32, height: u32) -> GazeSuggestion {
    let source = record.source();
    let bbox = normalize_bbox(record.bbox.as_deref(), source, width, height);
    let eye = normalize_point(record.eye.as_deref(), source, width, height);
    let gaze = match record.gaze.as_deref() {
        Some(g) => normalize_point(Some(g), source, width, height),
        None => eye,
    };
    GazeSuggestion { bbox, eye, gaze }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 200;
    const H: u32 = 100;

    // -- rectify_bbox --------------------------------------------------------

    #[test]
    fn rectify_negative_width() {
        assert_eq!(rectify_bbox(10.0, 10.0, -4.0, 6.0), (6.0, 10.0, 4.0, 6.0));
    }

    #[test]
    fn rectify_negative_height() {
        assert_eq!(rectify_bbox(5.0, 20.0, 3.0, -8.0), (5.0, 12.0, 3.0, 8.0));
    }

    #[test]
    fn rectify_positive_box_unchanged() {
        assert_eq!(rectify_bbox(1.0, 2.0, 3.0, 4.0), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn rectify_both_negative() {
        assert_eq!(rectify_bbox(10.0, 10.0, -4.0, -6.0), (6.0, 4.0, 4.0, 6.0));
    }

    // -- normalize_bbox ------------------------------------------------------

    #[test]
    fn normalized_bbox_passes_through() {
        let b = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(
            normalize_bbox(Some(&b), DatasetSource::GazeFollow, W, H),
            [0.1, 0.2, 0.3, 0.4]
        );
    }

    #[test]
    fn pixel_bbox_is_divided_by_dimensions() {
        let b = [20.0, 10.0, 100.0, 50.0];
        assert_eq!(
            normalize_bbox(Some(&b), DatasetSource::Vat, W, H),
            [0.1, 0.1, 0.5, 0.5]
        );
    }

    #[test]
    fn missing_bbox_falls_back_to_centered_box() {
        assert_eq!(normalize_bbox(None, DatasetSource::Vat, W, H), DEFAULT_BBOX);
    }

    #[test]
    fn short_bbox_falls_back_to_centered_box() {
        let b = [0.1, 0.2, 0.3];
        assert_eq!(
            normalize_bbox(Some(&b), DatasetSource::GazeFollow, W, H),
            DEFAULT_BBOX
        );
    }

    #[test]
    fn non_finite_bbox_falls_back_to_centered_box() {
        let b = [0.1, f64::NAN, 0.3, 0.4];
        assert_eq!(
            normalize_bbox(Some(&b), DatasetSource::GazeFollow, W, H),
            DEFAULT_BBOX
        );
    }

    #[test]
    fn oversized_bbox_is_clamped() {
        let b = [-0.5, 0.0, 1.8, 0.4];
        assert_eq!(
            normalize_bbox(Some(&b), DatasetSource::GazeFollow, W, H),
            [0.0, 0.0, 1.0, 0.4]
        );
    }

    #[test]
    fn negative_extent_pixel_bbox_rectifies_then_scales() {
        // Origin shifts left by the width before dividing.
        let b = [120.0, 50.0, -100.0, 25.0];
        assert_eq!(
            normalize_bbox(Some(&b), DatasetSource::Vat, W, H),
            [0.1, 0.5, 0.5, 0.25]
        );
    }

    // -- normalize_point -----------------------------------------------------

    #[test]
    fn normalized_point_passes_through_unclamped() {
        let p = [1.02, -0.01];
        assert_eq!(
            normalize_point(Some(&p), DatasetSource::GazeFollow, W, H),
            [1.02, -0.01]
        );
    }

    #[test]
    fn pixel_point_is_divided_by_dimensions() {
        let p = [100.0, 25.0];
        assert_eq!(
            normalize_point(Some(&p), DatasetSource::Vat, W, H),
            [0.5, 0.25]
        );
    }

    #[test]
    fn out_of_frame_sentinel_maps_to_small_negative() {
        let p = [-1.0, -1.0];
        assert_eq!(
            normalize_point(Some(&p), DatasetSource::Vat, W, H),
            [OUT_OF_FRAME, OUT_OF_FRAME]
        );
    }

    #[test]
    fn mixed_sentinel_only_affects_its_axis() {
        let p = [100.0, -1.0];
        assert_eq!(
            normalize_point(Some(&p), DatasetSource::Vat, W, H),
            [0.5, OUT_OF_FRAME]
        );
    }

    #[test]
    fn missing_point_falls_back_to_center() {
        assert_eq!(normalize_point(None, DatasetSource::Vat, W, H), DEFAULT_POINT);
    }

    #[test]
    fn short_point_falls_back_to_center() {
        let p = [0.4];
        assert_eq!(
            normalize_point(Some(&p), DatasetSource::GazeFollow, W, H),
            DEFAULT_POINT
        );
    }

    // -- suggest -------------------------------------------------------------

    fn vat_record() -> ImageRecord {
        ImageRecord {
            path: "clip_0042.jpg".to_string(),
            bbox: Some(vec![20.0, 10.0, 100.0, 50.0]),
            eye: Some(vec![70.0, 35.0]),
            gaze: Some(vec![-1.0, -1.0]),
            kind: "image".to_string(),
        }
    }

    #[test]
    fn suggest_normalizes_every_field() {
        let s = suggest(&vat_record(), W, H);
        assert_eq!(s.bbox, [0.1, 0.1, 0.5, 0.5]);
        assert_eq!(s.eye, [0.35, 0.35]);
        assert_eq!(s.gaze, [OUT_OF_FRAME, OUT_OF_FRAME]);
    }

    #[test]
    fn suggest_falls_back_to_eye_when_gaze_missing() {
        let mut record = vat_record();
        record.gaze = None;
        let s = suggest(&record, W, H);
        assert_eq!(s.gaze, s.eye);
    }

    #[test]
    fn suggest_on_empty_record_yields_defaults() {
        let record = ImageRecord {
            path: "train/1.jpg".to_string(),
            bbox: None,
            eye: None,
            gaze: None,
            kind: "image".to_string(),
        };
        let s = suggest(&record, W, H);
        assert_eq!(s.bbox, DEFAULT_BBOX);
        assert_eq!(s.eye, DEFAULT_POINT);
        assert_eq!(s.gaze, DEFAULT_POINT);
    }
}
