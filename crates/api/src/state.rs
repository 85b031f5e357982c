use std::sync::Arc;

use gazelab_store::{AnnotationStore, ImagePool};

use crate::config::ServerConfig;
use crate::session::SessionManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Filtered image pool, loaded once at startup and immutable after.
    pub pool: Arc<ImagePool>,
    /// The deployment's single durable annotation store.
    pub store: Arc<AnnotationStore>,
    /// Identity -> workset table (process lifetime, lost on restart).
    pub sessions: Arc<SessionManager>,
}
