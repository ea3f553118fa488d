//! Engine configuration
//!
//! Configuration is a TOML document. Every key is optional; missing keys fall
//! back to the built-in defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Built-in defaults, documented as a config file
const DEFAULT_CONFIG: &str = r#"
# Root of the template storage: <root>/<category>/<template>/
templates_dir = "templates"

[compiler]
program = "pdflatex"
args = ["-interaction=nonstopmode"]
timeout_secs = 30
passes = 2

[docx]
font = "Calibri"
font_size_pt = 11
"#;

/// Settings for the external typesetting compiler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilerConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub passes: u32,
}

impl CompilerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for DOCX output
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocxConfig {
    pub font: String,
    pub font_size_pt: u32,
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub templates_dir: PathBuf,
    /// Where artifacts and compile scratch dirs are created
    pub scratch_dir: Option<PathBuf>,
    pub compiler: CompilerConfig,
    pub docx: DocxConfig,
}

#[derive(Deserialize)]
struct TomlConfig {
    templates_dir: Option<PathBuf>,
    scratch_dir: Option<PathBuf>,
    compiler: Option<TomlCompiler>,
    docx: Option<TomlDocx>,
}

#[derive(Deserialize)]
struct TomlCompiler {
    program: Option<String>,
    args: Option<Vec<String>>,
    timeout_secs: Option<u64>,
    passes: Option<u32>,
}

#[derive(Deserialize)]
struct TomlDocx {
    font: Option<String>,
    font_size_pt: Option<u32>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string, filling gaps from the defaults
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(dir) = parsed.templates_dir {
            config.templates_dir = dir;
        }
        if parsed.scratch_dir.is_some() {
            config.scratch_dir = parsed.scratch_dir;
        }
        if let Some(compiler) = parsed.compiler {
            if let Some(program) = compiler.program {
                config.compiler.program = program;
            }
            if let Some(args) = compiler.args {
                config.compiler.args = args;
            }
            if let Some(timeout) = compiler.timeout_secs {
                config.compiler.timeout_secs = timeout;
            }
            if let Some(passes) = compiler.passes {
                config.compiler.passes = passes;
            }
        }
        if let Some(docx) = parsed.docx {
            if let Some(font) = docx.font {
                config.docx.font = font;
            }
            if let Some(size) = docx.font_size_pt {
                config.docx.font_size_pt = size;
            }
        }
        Ok(config)
    }

    /// Directory for artifacts and compile scratch space
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("resume-forge"))
    }

    /// Set the template storage root
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the scratch directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Set the compiler settings
    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let parsed: TomlConfig =
            toml::from_str(DEFAULT_CONFIG).expect("Default config should be valid TOML");
        let compiler = parsed.compiler.expect("Default config has a [compiler] table");
        let docx = parsed.docx.expect("Default config has a [docx] table");
        Self {
            templates_dir: parsed.templates_dir.unwrap_or_else(|| PathBuf::from("templates")),
            scratch_dir: parsed.scratch_dir,
            compiler: CompilerConfig {
                program: compiler.program.unwrap_or_else(|| "pdflatex".to_string()),
                args: compiler.args.unwrap_or_default(),
                timeout_secs: compiler.timeout_secs.unwrap_or(30),
                passes: compiler.passes.unwrap_or(2),
            },
            docx: DocxConfig {
                font: docx.font.unwrap_or_else(|| "Calibri".to_string()),
                font_size_pt: docx.font_size_pt.unwrap_or(11),
            },
        }
    }
}
