//! Whole-document persistence for annotation stores.
//!
//! A store document is a JSON array of [`AnnotationEntry`] values, read
//! and rewritten in full on every mutation. Writes go through a sibling
//! temp file and a rename so a failed write cannot leave a truncated
//! document behind.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use gazelab_core::annotation::AnnotationEntry;

use crate::error::StoreError;

/// Load a store document. A missing file is an empty document; the
/// running service creates the file on its first write.
pub fn load(path: &Path) -> Result<Vec<AnnotationEntry>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    serde_json::from_str(&text).map_err(|e| StoreError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replace a store document in full.
pub fn save(path: &Path, entries: &[AnnotationEntry]) -> Result<(), StoreError> {
    let text = serde_json::to_string(entries).map_err(|e| StoreError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text).map_err(|e| StoreError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
