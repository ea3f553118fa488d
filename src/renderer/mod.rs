//! Renderers turn a document data tree into a binary artifact
//!
//! Each template variant is a [`Renderer`] implementation. LaTeX variants
//! sanitize the tree, fill their skeleton and hand the result to the external
//! compiler; the DOCX variant emits structural blocks for the document
//! builder.

pub mod classic;
pub mod compiler;
pub mod cover_letter;
pub mod docx;
pub mod docx_resume;
pub mod escape;
pub mod latex;
pub mod skeleton;
pub mod twocolumn;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{CompilerConfig, DocxConfig, EngineConfig};
use crate::error::EngineError;

pub use classic::ClassicResumeRenderer;
pub use cover_letter::ClassicCoverLetterRenderer;
pub use docx::{Block, DocumentBuilder, Run};
pub use docx_resume::DocxResumeRenderer;
pub use escape::{escape_str, sanitize};
pub use skeleton::Skeleton;
pub use twocolumn::TwocolumnResumeRenderer;

/// Skeleton file name used when a manifest does not name one
pub const DEFAULT_SKELETON: &str = "template.tex";

/// Everything a renderer needs besides the data tree
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Directory of the template variant
    pub template_dir: PathBuf,
    /// Skeleton file name inside `template_dir`
    pub skeleton: String,
    pub compiler: CompilerConfig,
    pub docx: DocxConfig,
    /// Parent directory for per-render scratch dirs
    pub scratch_dir: PathBuf,
}

impl RenderContext {
    pub fn new(template_dir: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self {
            template_dir: template_dir.into(),
            skeleton: DEFAULT_SKELETON.to_string(),
            compiler: config.compiler.clone(),
            docx: config.docx.clone(),
            scratch_dir: config.scratch_dir(),
        }
    }

    pub fn with_skeleton(mut self, skeleton: impl Into<String>) -> Self {
        self.skeleton = skeleton.into();
        self
    }

    pub fn skeleton_path(&self) -> PathBuf {
        self.template_dir.join(&self.skeleton)
    }
}

/// Generated document body, before it becomes a binary artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Complete LaTeX source
    Markup(String),
    /// Structural writes for the document builder
    Blocks(Vec<Block>),
}

impl Body {
    pub fn as_markup(&self) -> Option<&str> {
        match self {
            Self::Markup(source) => Some(source),
            Self::Blocks(_) => None,
        }
    }

    pub fn as_blocks(&self) -> Option<&[Block]> {
        match self {
            Self::Markup(_) => None,
            Self::Blocks(blocks) => Some(blocks),
        }
    }
}

/// Contract shared by every template variant
pub trait Renderer: Send {
    /// Build a renderer for one request
    fn construct(ctx: RenderContext, data: Value) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Produce the document body; deterministic for a given instance
    fn generate(&self) -> Body;

    /// Write the final artifact to `output_path`
    fn export(&self, output_path: &Path) -> Result<PathBuf, EngineError>;
}

/// Type-erased constructor stored in the registration table
pub type RendererFactory = fn(RenderContext, Value) -> Result<Box<dyn Renderer>, EngineError>;

/// Construct `R` behind a trait object
pub fn construct_boxed<R: Renderer + 'static>(
    ctx: RenderContext,
    data: Value,
) -> Result<Box<dyn Renderer>, EngineError> {
    Ok(Box::new(R::construct(ctx, data)?))
}
