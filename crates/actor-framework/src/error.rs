//! # Framework Errors
//!
//! Errors raised by the actor runtime itself, as opposed to the business
//! errors an entity returns from its hooks (carried in [`FrameworkError::EntityError`]).

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    /// A conditional action saw a different revision than the caller expected.
    #[error("Revision conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },
    /// The actor only accepts caller-supplied keys.
    #[error("This actor requires caller-supplied keys")]
    KeyRequired,
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the entity's own error type, if that is what this wraps.
    ///
    /// Returns `Err(self)` unchanged for runtime errors or foreign entity errors.
    pub fn into_entity_error<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(e) => Ok(*e),
                Err(other) => Err(FrameworkError::EntityError(other)),
            },
            other => Err(other),
        }
    }

    /// True when the actor could not be reached or did not answer.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FrameworkError::ActorClosed | FrameworkError::ActorDropped)
    }
}
