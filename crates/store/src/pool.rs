//! Image pool loading and path resolution.
//!
//! The pool is the ordered set of dataset records whose backing image
//! file actually exists under the merged image root. It is loaded once
//! at startup and treated as immutable afterwards; worksets are handed
//! out as prefixes of this sequence.
//!
//! Layout of the merged root:
//!
//! ```text
//! <merged_root>/gazefollow/train/...   GazeFollow files at their relative paths
//! <merged_root>/gazefollow/test2/...
//! <merged_root>/vat/...                VAT files located by basename
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use gazelab_core::record::{DatasetSource, ImageRecord};

use crate::error::StoreError;

/// A pool record together with its resolved on-disk file.
#[derive(Debug, Clone)]
pub struct PoolImage {
    pub record: ImageRecord,
    pub file: PathBuf,
}

#[derive(Debug)]
pub struct ImagePool {
    images: Vec<PoolImage>,
}

impl ImagePool {
    /// Load the combined dataset index and keep only records whose
    /// backing file exists under `merged_root`, resolving each to its
    /// absolute path.
    pub fn load(index_path: &Path, merged_root: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(index_path).map_err(|e| StoreError::Io {
            path: index_path.to_path_buf(),
            source: e,
        })?;
        let records: Vec<ImageRecord> =
            serde_json::from_str(&text).map_err(|e| StoreError::Malformed {
                path: index_path.to_path_buf(),
                source: e,
            })?;
        let total = records.len();

        let gazefollow_root = merged_root.join("gazefollow");
        let vat_root = merged_root.join("vat");
        let gazefollow_paths = collect_relative_paths(&gazefollow_root);
        let vat_files = VatFileIndex::scan(&vat_root);

        let mut images = Vec::new();
        for record in records {
            let file = match record.source() {
                DatasetSource::GazeFollow => gazefollow_paths
                    .contains(&record.path)
                    .then(|| gazefollow_root.join(&record.path)),
                DatasetSource::Vat => vat_files.resolve(record.file_name()),
            };
            if let Some(file) = file {
                images.push(PoolImage { record, file });
            }
        }

        tracing::info!(
            total,
            available = images.len(),
            merged_root = %merged_root.display(),
            "Loaded image pool"
        );
        Ok(Self { images })
    }

    /// Build a pool from already-resolved images, bypassing the on-disk
    /// layout (mainly for tests).
    pub fn from_images(images: Vec<PoolImage>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&PoolImage> {
        self.images.get(position)
    }

    /// The full filtered sequence, in index-file order.
    pub fn images(&self) -> &[PoolImage] {
        &self.images
    }
}

/// Header-only dimension lookup for a pool image file.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32), StoreError> {
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    reader.into_dimensions().map_err(|e| StoreError::Image {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Relative paths (with `/` separators) of every file under `root`.
/// A missing or unreadable root yields an empty set, logged once.
fn collect_relative_paths(root: &Path) -> HashSet<String> {
    let mut paths = HashSet::new();
    visit_files(root, &mut |file| {
        if let Ok(rel) = file.strip_prefix(root) {
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            paths.insert(rel);
        }
    });
    paths
}

/// VAT files indexed by basename and by stem; resolution falls back to
/// the stem so `clip_0042` matches `clip_0042.jpg` and vice versa.
struct VatFileIndex {
    by_name: HashMap<String, PathBuf>,
    by_stem: HashMap<String, PathBuf>,
}

impl VatFileIndex {
    fn scan(root: &Path) -> Self {
        let mut by_name = HashMap::new();
        let mut by_stem = HashMap::new();
        visit_files(root, &mut |file| {
            if let Some(name) = file.file_name() {
                by_name
                    .entry(name.to_string_lossy().into_owned())
                    .or_insert_with(|| file.clone());
            }
            if let Some(stem) = file.file_stem() {
                by_stem
                    .entry(stem.to_string_lossy().into_owned())
                    .or_insert_with(|| file.clone());
            }
        });
        Self { by_name, by_stem }
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if let Some(file) = self.by_name.get(name) {
            return Some(file.clone());
        }
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        self.by_stem.get(stem).cloned()
    }
}

/// Depth-first walk over every regular file under `dir`. Unreadable
/// directories are logged and skipped.
fn visit_files(dir: &Path, visit: &mut impl FnMut(&PathBuf)) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable image directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit_files(&path, visit);
        } else {
            visit(&path);
        }
    }
}
