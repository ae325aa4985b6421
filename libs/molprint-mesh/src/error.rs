//! # Mesh Errors
//!
//! Error types for kernel operations.

use thiserror::Error;

/// Errors that can occur in the geometry kernel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Invalid mesh topology
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// Degenerate geometry (flat, empty or non-finite input)
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Boolean operation failed
    #[error("Boolean operation failed: {message}")]
    BooleanFailed { message: String },

    /// Mesh validation failed
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

impl MeshError {
    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates a boolean operation failed error.
    pub fn boolean_failed(message: impl Into<String>) -> Self {
        Self::BooleanFailed {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by unusable input geometry.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            Self::DegenerateGeometry { .. } | Self::InvalidTopology { .. }
        )
    }
}

/// Result type for kernel operations.
pub type MeshResult<T> = Result<T, MeshError>;
