//! Template discovery, the catalog cache and resolution to renderers

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::renderer::{RenderContext, Renderer, RendererFactory};

use super::binding;
use super::manifest::{Manifest, MANIFEST_FILE};

/// Preview image names, in lookup order
const PREVIEW_FILES: [(&str, &str); 3] = [
    ("preview.png", "image/png"),
    ("preview.jpg", "image/jpeg"),
    ("preview.jpeg", "image/jpeg"),
];

/// Installed templates: category -> sorted variant names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, Vec<String>>);

impl Catalog {
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn templates(&self, category: &str) -> Option<&[String]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn contains(&self, category: &str, name: &str) -> bool {
        self.templates(category)
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// Names installed for `category`, or `CategoryNotFound`
    pub fn category(&self, category: &str) -> Result<&[String], EngineError> {
        self.templates(category)
            .ok_or_else(|| EngineError::CategoryNotFound {
                category: category.to_string(),
                available: self.categories().map(str::to_string).collect(),
            })
    }

    /// Fail unless `name` is installed for `category`
    pub fn check(&self, category: &str, name: &str) -> Result<(), EngineError> {
        let names = self.category(category)?;
        if names.iter().any(|n| n == name) {
            Ok(())
        } else {
            Err(EngineError::TemplateNotFound {
                category: category.to_string(),
                name: name.to_string(),
                available: names.to_vec(),
            })
        }
    }
}

/// Either the whole catalog or the names of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    All(Catalog),
    Category(Vec<String>),
}

#[derive(Default)]
struct CatalogCache {
    /// Configured root -> canonical root
    keys: HashMap<PathBuf, PathBuf>,
    entries: HashMap<PathBuf, Arc<Catalog>>,
    scans: HashMap<PathBuf, usize>,
}

impl CatalogCache {
    /// Canonical key for `root`, touching the filesystem only on first sight
    fn key(&mut self, root: &Path) -> Result<PathBuf, EngineError> {
        if let Some(key) = self.keys.get(root) {
            return Ok(key.clone());
        }
        let key = fs::canonicalize(root).map_err(|_| EngineError::StorageNotFound {
            path: root.to_path_buf(),
        })?;
        self.keys.insert(root.to_path_buf(), key.clone());
        Ok(key)
    }

    /// Cached catalog for `root` without any filesystem access
    fn cached(&self, root: &Path) -> Option<Arc<Catalog>> {
        self.keys
            .get(root)
            .and_then(|key| self.entries.get(key))
            .map(Arc::clone)
    }
}

static CACHE: Lazy<Mutex<CatalogCache>> = Lazy::new(|| Mutex::new(CatalogCache::default()));

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__")
}

/// Visible subdirectories of `dir`, sorted by name
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>, EngineError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))? {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_hidden(&name) {
            continue;
        }
        dirs.push((name, path));
    }
    dirs.sort();
    Ok(dirs)
}

/// A variant needs a manifest and at least one `.tex` file
fn is_variant(dir: &Path) -> bool {
    if !dir.join(MANIFEST_FILE).is_file() {
        return false;
    }
    fs::read_dir(dir)
        .map(|entries| {
            entries.flatten().any(|entry| {
                entry.path().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "tex")
            })
        })
        .unwrap_or(false)
}

fn scan(root: &Path) -> Result<Catalog, EngineError> {
    let mut catalog = BTreeMap::new();
    for (category, category_dir) in subdirectories(root)? {
        let mut names = Vec::new();
        for (name, dir) in subdirectories(&category_dir)? {
            if is_variant(&dir) {
                names.push(name);
            } else {
                debug!(path = %dir.display(), "skipping directory without manifest or skeleton");
            }
        }
        catalog.insert(category, names);
    }
    Ok(Catalog(catalog))
}

/// A template resolved to its renderer implementation
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub category: String,
    pub name: String,
    pub identifier: String,
    pub manifest: Manifest,
    pub context: RenderContext,
    factory: RendererFactory,
}

impl ResolvedTemplate {
    pub fn factory(&self) -> RendererFactory {
        self.factory
    }

    /// Construct the renderer for `data`
    pub fn instantiate(&self, data: Value) -> Result<Box<dyn Renderer>, EngineError> {
        (self.factory)(self.context.clone(), data)
    }
}

/// Metadata about an installed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub category: String,
    pub description: String,
    pub preview: Option<PathBuf>,
}

impl TemplateInfo {
    /// Preview image as a `data:` URI, `None` when the template has no preview
    pub fn preview_data_uri(&self) -> Result<Option<String>, EngineError> {
        let Some(path) = &self.preview else {
            return Ok(None);
        };
        let bytes = fs::read(path).map_err(|e| EngineError::io(path, e))?;
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let media_type = PREVIEW_FILES
            .iter()
            .find(|(name, _)| *name == file_name)
            .map_or("application/octet-stream", |(_, media)| *media);
        Ok(Some(format!(
            "data:{media_type};base64,{}",
            STANDARD.encode(bytes)
        )))
    }
}

/// Default description: "Classic template for cover letter"
fn default_description(category: &str, name: &str) -> String {
    let mut chars = name.chars();
    let title: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{title} template for {}", category.replace('_', " "))
}

/// `<category>_<name>.pdf`, relative to the working directory
fn default_pdf_path(category: &str, name: &str) -> PathBuf {
    PathBuf::from(format!("{category}_{name}.pdf"))
}

/// Templates installed under one storage root
///
/// The catalog is scanned once per root and shared by every registry in the
/// process until [`invalidate`](Registry::invalidate) is called.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    config: EngineConfig,
}

impl Registry {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            root: config.templates_dir.clone(),
            config: config.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discovered templates, scanning storage on first use
    pub fn load(&self) -> Result<Arc<Catalog>, EngineError> {
        let mut cache = CACHE.lock();
        if let Some(catalog) = cache.cached(&self.root) {
            return Ok(catalog);
        }
        let key = cache.key(&self.root)?;
        if let Some(catalog) = cache.entries.get(&key) {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(scan(&key)?);
        *cache.scans.entry(key.clone()).or_default() += 1;
        info!(
            root = %key.display(),
            categories = catalog.as_map().len(),
            templates = catalog.as_map().values().map(Vec::len).sum::<usize>(),
            "scanned template storage"
        );
        cache.entries.insert(key, Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Whole catalog, or one category's names when `category` is given
    pub fn catalog(&self, category: Option<&str>) -> Result<Listing, EngineError> {
        let catalog = self.load()?;
        match category {
            Some(category) => Ok(Listing::Category(catalog.category(category)?.to_vec())),
            None => Ok(Listing::All(catalog.as_ref().clone())),
        }
    }

    /// Directory of an installed variant
    fn variant_dir(&self, category: &str, name: &str) -> Result<PathBuf, EngineError> {
        self.load()?.check(category, name)?;
        Ok(self.root.join(category).join(name))
    }

    /// Bind an installed variant to its renderer implementation
    pub fn resolve(&self, category: &str, name: &str) -> Result<ResolvedTemplate, EngineError> {
        let dir = self.variant_dir(category, name)?;
        let manifest = Manifest::load(&dir)?;
        let expected = binding::expected_identifier(category, name);

        if manifest.renderer != expected {
            return Err(EngineError::Binding {
                expected,
                path: Manifest::path_in(&dir),
                available: vec![manifest.renderer],
            });
        }
        let registration = binding::lookup(&expected).ok_or_else(|| EngineError::Binding {
            expected: expected.clone(),
            path: Manifest::path_in(&dir),
            available: binding::registered_for(category),
        })?;

        debug!(category, name, renderer = %expected, "resolved template");
        let context =
            RenderContext::new(&dir, &self.config).with_skeleton(manifest.skeleton());
        Ok(ResolvedTemplate {
            category: category.to_string(),
            name: name.to_string(),
            identifier: expected,
            manifest,
            context,
            factory: registration.factory,
        })
    }

    /// Resolve and construct a renderer for `data`
    pub fn instantiate(
        &self,
        category: &str,
        name: &str,
        data: Value,
    ) -> Result<Box<dyn Renderer>, EngineError> {
        self.resolve(category, name)?.instantiate(data)
    }

    /// Render `data` with an installed variant straight to a PDF
    ///
    /// Without an explicit path the file lands in the working directory as
    /// `<category>_<name>.pdf`.
    pub fn generate_pdf(
        &self,
        category: &str,
        name: &str,
        data: Value,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, EngineError> {
        let output = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_pdf_path(category, name));
        self.instantiate(category, name, data)?.export(&output)
    }

    /// Metadata and preview location for an installed variant
    pub fn info(&self, category: &str, name: &str) -> Result<TemplateInfo, EngineError> {
        let dir = self.variant_dir(category, name)?;
        let manifest = Manifest::load(&dir)?;
        let preview = PREVIEW_FILES
            .iter()
            .map(|(file, _)| dir.join(file))
            .find(|path| path.is_file());
        Ok(TemplateInfo {
            name: name.to_string(),
            category: category.to_string(),
            description: manifest
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| default_description(category, name)),
            preview,
        })
    }

    /// Drop the cached catalog for this root; the next call rescans
    pub fn invalidate(&self) {
        let mut cache = CACHE.lock();
        if let Ok(key) = cache.key(&self.root) {
            cache.entries.remove(&key);
            cache.keys.retain(|_, k| *k != key);
        }
    }

    /// How many times this root has been scanned in this process
    pub fn scan_count(&self) -> usize {
        let mut cache = CACHE.lock();
        cache
            .key(&self.root)
            .ok()
            .and_then(|key| cache.scans.get(&key).copied())
            .unwrap_or(0)
    }
}
