use crate::types::EntryIndex;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with index {index}")]
    NotFound {
        entity: &'static str,
        index: EntryIndex,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
