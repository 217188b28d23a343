use thiserror::Error;

/// Result type alias for credo operations
pub type Result<T> = std::result::Result<T, CredoError>;

/// Errors produced by the trust layer
#[derive(Error, Debug)]
pub enum CredoError {
    /// Malformed certificate bytes. Decoding never yields a partial
    /// certificate; the caller gets this error or a complete value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Lookup of an unknown key or certificate name in the trust store.
    /// Existence checks return booleans and never raise this.
    #[error("not found: {name}")]
    NotFound {
        /// Canonical form of the name that wasn't found
        name: String,
    },

    /// Operation intentionally unsupported by the backend
    #[error("not implemented: {operation}")]
    NotImplemented {
        /// Name of the unsupported operation
        operation: &'static str,
    },

    /// Certificate fetch failed (not-found, timeout, transport error)
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Validation rejected with a human-readable reason
    #[error("validation failed: {0}")]
    Validation(String),
}

impl CredoError {
    /// Returns true if the error is a trust-store miss
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the error marks an unsupported backend operation
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }

    /// Returns true if the error came from malformed bytes
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
