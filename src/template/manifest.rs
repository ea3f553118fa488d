//! Per-variant `template.toml` manifest

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::EngineError;
use crate::renderer::DEFAULT_SKELETON;

/// File that marks a directory as a template variant
pub const MANIFEST_FILE: &str = "template.toml";

/// Contents of a variant's `template.toml`
///
/// ```toml
/// renderer = "ClassicResumeRenderer"
/// skeleton = "template.tex"
/// description = "Single column, serif headings"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Identifier of the renderer implementation this variant binds to
    pub renderer: String,
    #[serde(default)]
    pub skeleton: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    /// Path of the manifest inside a variant directory
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Read and parse the manifest of the variant at `dir`
    pub fn load(dir: &Path) -> Result<Self, EngineError> {
        let path = Self::path_in(dir);
        let content = std::fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
        Self::parse(&content, &path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, EngineError> {
        toml::from_str(content).map_err(|e| EngineError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Skeleton file name, falling back to the default
    pub fn skeleton(&self) -> &str {
        self.skeleton.as_deref().unwrap_or(DEFAULT_SKELETON)
    }
}
