//! Gazelab domain core.
//!
//! Domain types shared by the store and API layers: image pool records,
//! annotation records and entries, validation helpers, and the pure
//! coordinate normalizer that turns dataset ground truth into drawing
//! suggestions.

pub mod annotation;
pub mod error;
pub mod record;
pub mod suggest;
pub mod types;
