//! JSON-document persistence for gaze annotations.
//!
//! Owns the durable side of the system: the filtered image pool, the
//! index-addressed annotation store (whole-document read-modify-write),
//! and the offline merge engine that consolidates many per-annotator
//! documents into one canonical store.

pub mod document;
pub mod error;
pub mod merge;
pub mod pool;
pub mod store;

pub use error::StoreError;
pub use pool::ImagePool;
pub use store::AnnotationStore;
