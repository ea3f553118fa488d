//! Resume Forge - résumé and cover-letter rendering from structured data
//!
//! This library discovers templates on disk, binds each one to a renderer
//! implementation and turns a JSON data tree into a PDF (through an external
//! LaTeX compiler) or a DOCX document.
//!
//! # Example
//!
//! ```no_run
//! use resume_forge::{DocumentRequest, DocumentType, Engine, EngineConfig, OutputFormat};
//! use serde_json::json;
//!
//! let engine = Engine::new(EngineConfig::default().with_templates_dir("templates"));
//! let request = DocumentRequest::new(
//!     DocumentType::Resume,
//!     "classic",
//!     OutputFormat::Pdf,
//!     json!({"personalInfo": {"name": "Jane Roe", "email": "jane@example.com"}}),
//! );
//! let artifact = engine.produce(&request).unwrap();
//! assert_eq!(artifact.filename(), "resume_Jane_Roe.pdf");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod renderer;
pub mod schema;
pub mod template;

pub use config::{CompilerConfig, ConfigError, DocxConfig, EngineConfig};
pub use engine::{Artifact, Engine};
pub use error::EngineError;
pub use model::{DocumentData, DocumentRequest, DocumentType, OutputFormat};
pub use renderer::{sanitize, Body, RenderContext, Renderer};
pub use template::{Catalog, Listing, Registry, TemplateInfo};
