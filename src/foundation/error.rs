/// Convenience result type used across scrollreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by stage, store, and renderer APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A document element the stage depends on does not exist.
    #[error("missing document element '#{0}'")]
    MissingElement(String),

    /// Errors while fetching or decoding sequence frames.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while drawing onto the canvas surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::MissingElement`] value.
    pub fn missing_element(id: impl Into<String>) -> Self {
        Self::MissingElement(id.into())
    }

    /// Build a [`ReelError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
