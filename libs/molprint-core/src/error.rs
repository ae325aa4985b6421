//! # Pipeline Errors
//!
//! Error types for the print preparation pipeline.
//!
//! Errors returned from an operation mean the operation was refused and
//! nothing was mutated. Failures that the pipeline recovers from (a single
//! boolean inside a join, a degenerate hull while flooring) are instead
//! recorded as [`Diagnostic`]s on the session.

use crate::primitive::PrimitiveId;
use molprint_mesh::MeshError;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while preparing a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MolPrintError {
    /// A boolean or hull received coincident or non-manifold input.
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// A primitive lacks an attribute the operation reads.
    #[error("Primitive {id} has no {attribute}")]
    MissingAttribute {
        id: PrimitiveId,
        attribute: &'static str,
    },

    /// A stage was invoked before the stage it depends on.
    #[error("Cannot {operation}: {requirement}")]
    PreconditionNotMet {
        operation: &'static str,
        requirement: String,
    },

    /// The operation needs exactly one selected object or face set.
    #[error("Ambiguous selection: {message}")]
    AmbiguousSelection { message: String },

    /// An identifier that is not (or no longer) in the registry.
    #[error("Unknown primitive {0}")]
    UnknownPrimitive(PrimitiveId),

    /// Settings outside their accepted ranges, or unparsable settings.
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    /// A scene description that is not valid JSON or misses fields.
    #[error("Invalid scene: {message}")]
    InvalidScene { message: String },

    /// Error reported by the geometry kernel.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl From<serde_json::Error> for MolPrintError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidScene {
            message: err.to_string(),
        }
    }
}

impl MolPrintError {
    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates a precondition error.
    pub fn precondition(operation: &'static str, requirement: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            operation,
            requirement: requirement.into(),
        }
    }

    /// Creates an ambiguous selection error.
    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::AmbiguousSelection {
            message: message.into(),
        }
    }

    /// Creates an invalid settings error.
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    /// Returns true if the error came from bad geometry rather than bad usage.
    pub fn is_geometric(&self) -> bool {
        matches!(self, Self::DegenerateGeometry { .. } | Self::Mesh(_))
    }
}

/// Result type for pipeline operations.
pub type MolPrintResult<T> = Result<T, MolPrintError>;

/// A recoverable failure recorded during an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Operation that recorded the failure (e.g. `"pin join"`)
    pub operation: &'static str,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

// =============================================================================
// TESTS
// =============================================================================
