use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A lookup entity cannot be deleted while polishes still point at it.
    #[error("{entity} '{name}' is still referenced by {count} polish(es)")]
    StillReferenced {
        entity: &'static str,
        name: String,
        count: i64,
    },
}
