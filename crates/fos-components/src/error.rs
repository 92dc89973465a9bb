//! Component Errors

use crate::tree::ElementId;
use crate::validation::ValidationFailure;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ComponentError>;

/// Component error
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A declaration would shadow an existing method of the type
    #[error("Method '{0}' already exists.")]
    SchemaConflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Invalid input for '{key}': {reason}")]
    InputShape { key: String, reason: String },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Invalid component name: {0}")]
    InvalidComponentName(String),

    #[error("Component already defined: {0}")]
    DuplicateComponent(String),

    #[error("Undefined method '{0}'")]
    UnknownAccessor(String),

    #[error("No such element: {0:?}")]
    NoSuchElement(ElementId),
}

impl ComponentError {
    pub(crate) fn input_shape(key: &str, reason: impl Into<String>) -> Self {
        Self::InputShape {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
