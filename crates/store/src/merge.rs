//! Cross-file merge/consolidation engine.
//!
//! Reads any number of independently produced store documents, regroups
//! every annotation record by its image identity, and emits one
//! canonical store: one entry per distinct image key, fresh sequential
//! indices, records in encounter order. Entries are per-session but
//! annotations about the same image can come from different entries and
//! different files, so the record (not the entry) is the grouping unit.
//!
//! Single-threaded batch code: run to completion once per invocation,
//! no partial or resumable state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gazelab_core::annotation::{AnnotationEntry, AnnotationRecord};

use crate::document;
use crate::error::StoreError;

/// Shared bucket for records that carry no image identity key. One
/// bucket across all inputs: lost-and-found, not an error.
pub const UNKNOWN_IMAGE_KEY: &str = "__unknown__";

/// Outcome of one merge run.
#[derive(Debug)]
pub struct MergeReport {
    /// The canonical document: one entry per distinct image key.
    pub entries: Vec<AnnotationEntry>,
    pub files_merged: usize,
    pub files_skipped: usize,
}

/// Merge store documents into one canonical document.
///
/// Inputs are processed in sorted-path order; grouping is exact string
/// equality on the record's `image_path` (no canonicalization). With
/// `tag_annotator`, records are stamped with the source file's stem
/// unless they already carry a tag. Unreadable or malformed inputs are
/// logged and skipped; an empty input set is a usage error.
pub fn merge_documents(
    inputs: &[PathBuf],
    tag_annotator: bool,
) -> Result<MergeReport, StoreError> {
    if inputs.is_empty() {
        return Err(StoreError::EmptyInput);
    }

    let mut inputs: Vec<&PathBuf> = inputs.iter().collect();
    inputs.sort();

    // Key-encounter order decides output indices; the map only provides
    // O(1) bucket lookup.
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<AnnotationRecord>> = HashMap::new();
    let mut files_merged = 0;
    let mut files_skipped = 0;

    for path in inputs {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "Skipping missing input document");
            files_skipped += 1;
            continue;
        }
        let entries = match document::load(path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed input document");
                files_skipped += 1;
                continue;
            }
        };
        files_merged += 1;

        let annotator = annotator_id(path);
        for entry in entries {
            for mut record in entry.annotations {
                if tag_annotator && record.annotator_id.is_none() {
                    record.annotator_id = Some(annotator.clone());
                }
                let key = record
                    .image_path
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| UNKNOWN_IMAGE_KEY.to_string());
                if !buckets.contains_key(&key) {
                    order.push(key.clone());
                }
                buckets.entry(key).or_default().push(record);
            }
        }
    }

    let entries = order
        .into_iter()
        .enumerate()
        .map(|(i, key)| {
            let annotations = buckets.remove(&key).unwrap_or_default();
            AnnotationEntry {
                index: i as i64,
                annotations,
                image_path: Some(key),
            }
        })
        .collect();

    Ok(MergeReport {
        entries,
        files_merged,
        files_skipped,
    })
}

/// Annotator identifier derived from the input's file stem.
fn annotator_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
