//! Request handlers.
//!
//! Each submodule covers one surface: session worksets, annotation
//! persistence, gaze suggestions, image serving, and health. Handlers
//! delegate to `gazelab_store` and map errors via [`crate::error::AppError`].

pub mod annotation;
pub mod health;
pub mod image;
pub mod suggestion;
pub mod workset;
