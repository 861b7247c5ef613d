/// Convenience result type used across relens.
pub type RelensResult<T> = Result<T, RelensError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RelensError {
    /// Transform parameters are unusable (non-positive or non-finite scale).
    #[error("invalid transform: {0}")]
    InvalidTransform(String),

    /// Bytes are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// File read/write/delete failure.
    #[error("io error: {0}")]
    Io(String),

    /// A referenced id or file is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// One or both composite inputs are unusable.
    #[error("composition error: {0}")]
    Composition(String),

    /// The export collaborator refused the write.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// An operation exceeded its time budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RelensError {
    /// Build a [`RelensError::InvalidTransform`] value.
    pub fn invalid_transform(msg: impl Into<String>) -> Self {
        Self::InvalidTransform(msg.into())
    }

    /// Build a [`RelensError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`RelensError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`RelensError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`RelensError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`RelensError::PermissionDenied`] value.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Build a [`RelensError::Timeout`] value.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Build a [`RelensError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
