//! Request-level facade over the registry and the renderers

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{file_stem, DocumentRequest, DocumentType, OutputFormat};
use crate::renderer::{compiler, DocxResumeRenderer, RenderContext, Renderer};
use crate::schema;
use crate::template::{Listing, Registry, TemplateInfo};

/// A produced document on disk
///
/// With `clean_up` set the file is removed when the artifact is dropped;
/// call [`keep`](Artifact::keep) or [`persist`](Artifact::persist) to hold on
/// to it.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    filename: String,
    format: OutputFormat,
    clean_up: bool,
}

impl Artifact {
    /// Location of the artifact in the scratch directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Suggested download name, e.g. `resume_Jane_Roe.pdf`
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn clean_up(&self) -> bool {
        self.clean_up
    }

    /// Disable cleanup and return the scratch path
    pub fn keep(mut self) -> PathBuf {
        self.clean_up = false;
        self.path.clone()
    }

    /// Move the artifact to `dest`
    pub fn persist(mut self, dest: &Path) -> Result<PathBuf, EngineError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        compiler::move_file(&self.path, dest)?;
        self.clean_up = false;
        Ok(dest.to_path_buf())
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.clean_up {
            remove_quietly(&self.path);
        }
    }
}

/// Remove a file, logging anything but "already gone"
fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
    }
}

/// `<document_type>_<Name_With_Underscores>.<ext>`
fn suggested_filename(document_type: DocumentType, format: OutputFormat, data: &Value) -> String {
    let name = data
        .pointer("/personalInfo/name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    format!("{document_type}_{}.{}", file_stem(name), format.extension())
}

/// Entry point for producing documents
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    registry: Registry,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let registry = Registry::new(&config);
        Self { config, registry }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Installed templates, optionally for one category
    pub fn catalog(&self, category: Option<&str>) -> Result<Listing, EngineError> {
        self.registry.catalog(category)
    }

    pub fn info(&self, category: &str, name: &str) -> Result<TemplateInfo, EngineError> {
        self.registry.info(category, name)
    }

    /// Expected data schema and a minimal example for `document_type`
    pub fn schema(&self, document_type: DocumentType) -> Value {
        schema::schema(document_type)
    }

    /// Render a request into an artifact in the scratch directory
    pub fn produce(&self, request: &DocumentRequest) -> Result<Artifact, EngineError> {
        let started = Instant::now();
        let category = request.document_type.as_str();

        self.registry.load()?.check(category, &request.template)?;

        if request.document_type == DocumentType::CoverLetter
            && request.format == OutputFormat::Docx
        {
            return Err(EngineError::UnsupportedCombination {
                document_type: request.document_type,
                format: request.format,
            });
        }

        let scratch = self.config.scratch_dir();
        fs::create_dir_all(&scratch).map_err(|e| EngineError::io(&scratch, e))?;
        let output = scratch.join(format!("{}.{}", Uuid::new_v4(), request.format.extension()));

        if let Err(e) = self.render(request, &output) {
            remove_quietly(&output);
            warn!(
                document_type = %request.document_type,
                template = %request.template,
                error = %e,
                "render failed"
            );
            return Err(e);
        }

        info!(
            document_type = %request.document_type,
            template = %request.template,
            format = %request.format,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document produced"
        );
        Ok(Artifact {
            path: output,
            filename: suggested_filename(request.document_type, request.format, &request.data),
            format: request.format,
            clean_up: request.clean_up,
        })
    }

    fn render(&self, request: &DocumentRequest, output: &Path) -> Result<PathBuf, EngineError> {
        let category = request.document_type.as_str();
        let renderer: Box<dyn Renderer> = match request.format {
            OutputFormat::Pdf => {
                self.registry
                    .instantiate(category, &request.template, request.data.clone())?
            }
            OutputFormat::Docx => {
                let dir = self.registry.root().join(category).join(&request.template);
                let ctx = RenderContext::new(dir, &self.config);
                Box::new(DocxResumeRenderer::construct(ctx, request.data.clone())?)
            }
        };
        renderer.export(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_suggested_filename() {
        let data = json!({"personalInfo": {"name": "Jane Roe"}});
        assert_eq!(
            suggested_filename(DocumentType::Resume, OutputFormat::Pdf, &data),
            "resume_Jane_Roe.pdf"
        );
        assert_eq!(
            suggested_filename(DocumentType::CoverLetter, OutputFormat::Pdf, &json!({})),
            "cover_letter_output.pdf"
        );
    }

    #[test]
    fn test_suggested_filename_stays_in_place() {
        let data = json!({"personalInfo": {"name": "x/../../../tmp/pwned"}});
        let filename = suggested_filename(DocumentType::Resume, OutputFormat::Docx, &data);
        assert_eq!(filename, "resume_x_.._.._.._tmp_pwned.docx");
        assert_eq!(Path::new(&filename).components().count(), 1);

        let data = json!({"personalInfo": {"name": ".hidden"}});
        assert_eq!(
            suggested_filename(DocumentType::Resume, OutputFormat::Pdf, &data),
            "resume_hidden.pdf"
        );
    }

    #[test]
    fn test_schema_per_document_type() {
        let engine = Engine::new(EngineConfig::default());
        let resume = engine.schema(DocumentType::Resume);
        let letter = engine.schema(DocumentType::CoverLetter);
        assert_eq!(resume["schema"]["required"], json!(["personalInfo"]));
        assert_eq!(letter["schema"]["required"], json!(["personalInfo", "content"]));
    }

    #[test]
    fn test_artifact_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        fs::write(&path, b"%PDF").unwrap();
        let artifact = Artifact {
            path: path.clone(),
            filename: "resume_A.pdf".to_string(),
            format: OutputFormat::Pdf,
            clean_up: true,
        };
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_artifact_keep_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.pdf");
        fs::write(&kept, b"%PDF").unwrap();
        let artifact = Artifact {
            path: kept.clone(),
            filename: "resume_A.pdf".to_string(),
            format: OutputFormat::Pdf,
            clean_up: true,
        };
        assert_eq!(artifact.keep(), kept);
        assert!(kept.exists());

        let moved = Artifact {
            path: kept.clone(),
            filename: "resume_A.pdf".to_string(),
            format: OutputFormat::Pdf,
            clean_up: true,
        };
        let dest = dir.path().join("out/resume_A.pdf");
        assert_eq!(moved.persist(&dest).unwrap(), dest);
        assert!(dest.exists());
        assert!(!kept.exists());
    }
}
