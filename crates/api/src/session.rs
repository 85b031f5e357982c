//! Anonymous session identity and workset assignment.
//!
//! Worksets live in one process-scoped table guarded by a single mutex.
//! There is deliberately no durable backing: identities and their
//! bindings die with the process, and a returning annotator simply gets
//! a fresh identity and the same deterministic image sequence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use gazelab_store::pool::{ImagePool, PoolImage};

/// Cookie carrying the anonymous annotator identity.
pub const SESSION_COOKIE: &str = "annotator_id";

/// The fixed ordered list of images assigned to one session.
pub type Workset = Vec<PoolImage>;

pub struct SessionManager {
    pool: Arc<ImagePool>,
    images_per_session: usize,
    /// One table, one lock: concurrent first requests for the same new
    /// identity must agree on the binding.
    worksets: Mutex<HashMap<String, Arc<Workset>>>,
}

impl SessionManager {
    pub fn new(pool: Arc<ImagePool>, images_per_session: usize) -> Self {
        Self {
            pool,
            images_per_session,
            worksets: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the workset bound to `identity`, binding a deterministic
    /// prefix of the filtered pool on first access.
    ///
    /// Idempotent: later calls return the originally bound sequence,
    /// never a recomputation. The pool is immutable after startup, so
    /// every identity receives the same prefix.
    pub fn resolve(&self, identity: &str) -> Arc<Workset> {
        let mut worksets = self
            .worksets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(workset) = worksets.get(identity) {
            return Arc::clone(workset);
        }

        let take = self.pool.len().min(self.images_per_session);
        let workset = Arc::new(self.pool.images()[..take].to_vec());
        worksets.insert(identity.to_string(), Arc::clone(&workset));

        tracing::info!(identity, images = workset.len(), "Assigned workset to new session");
        workset
    }

    /// Number of sessions with a bound workset.
    pub fn session_count(&self) -> usize {
        self.worksets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
