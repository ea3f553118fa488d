//! Error types for template resolution and rendering

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{DocumentType, OutputFormat};

/// Errors that can occur anywhere in the render pipeline
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request data failed validation
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A required top-level section is absent from the data tree
    #[error("missing required section: {section}")]
    MissingSection { section: String },

    /// Unknown document category
    #[error("category not found: {category} (available: {})", available.join(", "))]
    CategoryNotFound {
        category: String,
        available: Vec<String>,
    },

    /// Template name not installed for its category
    #[error("template not found: {name} for {category} (available: {})", available.join(", "))]
    TemplateNotFound {
        category: String,
        name: String,
        available: Vec<String>,
    },

    /// Document type and output format cannot be combined
    #[error("{format} output is not supported for {document_type}")]
    UnsupportedCombination {
        document_type: DocumentType,
        format: OutputFormat,
    },

    /// Catalog entry exists but no renderer could be bound to it
    #[error(
        "renderer '{expected}' not found for {} (available identifiers: {})",
        path.display(),
        available.join(", ")
    )]
    Binding {
        expected: String,
        path: PathBuf,
        available: Vec<String>,
    },

    /// Template manifest could not be parsed
    #[error("invalid template manifest {}: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    /// External compiler failed or timed out
    #[error("compilation failed: {message}\n{log}")]
    Compilation { message: String, log: String },

    /// Compiler reported success but produced no output
    #[error("compiler reported success but {} was not produced\n{log}", path.display())]
    ArtifactMissing { path: PathBuf, log: String },

    /// Storage read/write/move failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template storage root does not exist
    #[error("template storage not found: {}", path.display())]
    StorageNotFound { path: PathBuf },
}

impl EngineError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a missing section error
    pub fn missing_section(section: impl Into<String>) -> Self {
        Self::MissingSection {
            section: section.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a compilation error carrying the captured diagnostics
    pub fn compilation(message: impl Into<String>, log: impl Into<String>) -> Self {
        Self::Compilation {
            message: message.into(),
            log: log.into(),
        }
    }

    /// HTTP-equivalent status for callers that surface errors over a wire
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation { .. }
            | Self::MissingSection { .. }
            | Self::UnsupportedCombination { .. } => 400,
            Self::CategoryNotFound { .. } | Self::TemplateNotFound { .. } => 404,
            Self::Binding { .. }
            | Self::InvalidManifest { .. }
            | Self::Compilation { .. }
            | Self::ArtifactMissing { .. }
            | Self::Io { .. }
            | Self::StorageNotFound { .. } => 500,
        }
    }

    /// Whether the caller caused this error
    pub fn is_client_error(&self) -> bool {
        self.status() < 500
    }

    /// Captured compiler diagnostics, if any
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::Compilation { log, .. } | Self::ArtifactMissing { log, .. } => Some(log),
            _ => None,
        }
    }
}
