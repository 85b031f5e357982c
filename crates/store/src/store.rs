//! Index-addressed annotation store.
//!
//! One [`AnnotationStore`] owns one durable JSON document shared by all
//! sessions of a deployment. Every mutation is a whole-document
//! read-modify-write serialized through a per-instance write gate, so
//! concurrent human-speed writers cannot lose each other's updates.
//! Index allocation is cached per (identity, workset position) for the
//! process lifetime only; the cache is deliberately not durable (see
//! DESIGN.md for the duplicate-slot consequence after a restart).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use gazelab_core::annotation::{AnnotationEntry, AnnotationRecord};
use gazelab_core::types::{EntryIndex, SessionId};
use serde_json::Value;

use crate::document;
use crate::error::StoreError;

pub struct AnnotationStore {
    path: PathBuf,
    /// Serializes every read-modify-write cycle over the document.
    write_gate: Mutex<()>,
    /// (identity, workset position) -> allocated entry index.
    session_indices: Mutex<HashMap<(SessionId, usize), EntryIndex>>,
}

impl AnnotationStore {
    /// Open a store, creating the parent directory and an empty document
    /// if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        if !path.exists() {
            document::save(&path, &[])?;
        }

        Ok(Self {
            path,
            write_gate: Mutex::new(()),
            session_indices: Mutex::new(HashMap::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document.
    pub fn entries(&self) -> Result<Vec<AnnotationEntry>, StoreError> {
        document::load(&self.path)
    }

    /// Next free index for a document: 1 + the maximum existing index,
    /// or 0 when the document is empty. Indices stay unique but not
    /// necessarily contiguous if entries were removed externally.
    pub fn next_index(entries: &[AnnotationEntry]) -> EntryIndex {
        entries.iter().map(|e| e.index).max().map_or(0, |max| max + 1)
    }

    /// Allocate (or return the cached) entry index for one session's
    /// workset slot.
    ///
    /// The allocation also respects indices handed out to other live
    /// sessions that have not written their entry yet, so two concurrent
    /// first-writes cannot be given the same index.
    pub fn allocate_index(
        &self,
        identity: &str,
        position: usize,
    ) -> Result<EntryIndex, StoreError> {
        let mut cache = self
            .session_indices
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let key = (identity.to_string(), position);
        if let Some(&index) = cache.get(&key) {
            return Ok(index);
        }

        let entries = document::load(&self.path)?;
        let pending = cache.values().copied().max().map_or(0, |max| max + 1);
        let index = Self::next_index(&entries).max(pending);
        cache.insert(key, index);

        tracing::debug!(identity, position, index, "Allocated annotation index");
        Ok(index)
    }

    /// Full-replace upsert: set the entry's annotation list, appending a
    /// new entry when the index is not present. Last write wins.
    pub fn upsert_annotations(
        &self,
        index: EntryIndex,
        annotations: Vec<AnnotationRecord>,
    ) -> Result<(), StoreError> {
        self.with_document(|entries| {
            let entry = entry_mut(entries, index);
            entry.annotations = annotations;
            Ok(())
        })
    }

    /// Field-level upsert: set one field on the annotation at `position`
    /// inside the entry, or append a minimal annotation carrying only
    /// that field when the position is absent or out of range.
    ///
    /// The append fallback is load-bearing: it is the only path for late
    /// field updates that have no matching 2D annotation.
    pub fn upsert_field(
        &self,
        index: EntryIndex,
        position: Option<usize>,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.with_document(|entries| {
            let entry = entry_mut(entries, index);
            match position.and_then(|p| entry.annotations.get_mut(p)) {
                Some(ann) => ann.set_field(field, value)?,
                None => entry
                    .annotations
                    .push(AnnotationRecord::with_field(field, value)?),
            }
            Ok(())
        })
    }

    /// 3D gaze variant of the field-level upsert: sets `gaze_3d` (and
    /// `gaze_number` when supplied) in a single read-modify-write pass.
    pub fn upsert_gaze3d(
        &self,
        index: EntryIndex,
        position: Option<usize>,
        gaze_3d: [f64; 3],
        gaze_number: Option<i64>,
    ) -> Result<(), StoreError> {
        self.with_document(|entries| {
            let entry = entry_mut(entries, index);
            match position.and_then(|p| entry.annotations.get_mut(p)) {
                Some(ann) => {
                    ann.gaze_3d = Some(gaze_3d);
                    if gaze_number.is_some() {
                        ann.gaze_number = gaze_number;
                    }
                }
                None => {
                    let mut ann = AnnotationRecord {
                        gaze_3d: Some(gaze_3d),
                        ..Default::default()
                    };
                    ann.gaze_number = gaze_number;
                    entry.annotations.push(ann);
                }
            }
            Ok(())
        })
    }

    /// Run one exclusive load-mutate-save cycle. The closure's error
    /// aborts the cycle before anything is written back.
    fn with_document<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<AnnotationEntry>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _gate = self
            .write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut entries = document::load(&self.path)?;
        let out = mutate(&mut entries)?;
        document::save(&self.path, &entries)?;
        Ok(out)
    }
}

/// Find the entry with the given index, appending an empty one when absent.
fn entry_mut(entries: &mut Vec<AnnotationEntry>, index: EntryIndex) -> &mut AnnotationEntry {
    let pos = match entries.iter().position(|e| e.index == index) {
        Some(pos) => pos,
        None => {
            entries.push(AnnotationEntry::new(index));
            entries.len() - 1
        }
    };
    &mut entries[pos]
}
