use thiserror::Error;

use crate::prompts::ModuleKind;

/// Errors surfaced to the person filling in the profile.
///
/// Configuration errors are fatal and only raised while building the
/// [`Coach`](crate::coach::Coach). The other two are recoverable: the caller
/// shows the message and may try again.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid profile field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("failed to generate {module}: {message}")]
    Generation { module: ModuleKind, message: String },
}

impl CoachError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CoachError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn generation(module: ModuleKind, message: impl Into<String>) -> Self {
        CoachError::Generation {
            module,
            message: message.into(),
        }
    }

    /// Whether the user can fix the problem and retry within the same session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoachError::Configuration(_))
    }
}
