//! Shared plumbing for LaTeX-based renderers
//!
//! Fragment helpers here assume their inputs were already escaped by
//! [`sanitize`](super::escape::sanitize); only mapping keys, which sanitizing
//! leaves alone, are escaped on the way out.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::EngineError;
use crate::model::{self, DocumentData, Lines, Skills};

use super::compiler;
use super::escape::{escape_str, sanitize};
use super::skeleton::Skeleton;
use super::RenderContext;

/// Sanitized data plus the loaded skeleton for one render
#[derive(Debug, Clone)]
pub struct LatexInput {
    pub ctx: RenderContext,
    pub data: DocumentData,
    /// Unescaped tree, read only for link targets
    pub raw: DocumentData,
    pub skeleton: Skeleton,
}

impl LatexInput {
    /// Validate, sanitize and load the skeleton
    pub fn prepare(ctx: RenderContext, data: Value) -> Result<Self, EngineError> {
        model::require_personal_info(&data)?;
        let raw = DocumentData::from_value(&data)?;
        let data = DocumentData::from_value(&sanitize(&data))?;
        let skeleton = Skeleton::load(&ctx.skeleton_path())?;
        debug!(skeleton = %skeleton.path().display(), "loaded skeleton");
        Ok(Self {
            ctx,
            data,
            raw,
            skeleton,
        })
    }

    /// Publication entries as `\publicationentry{title}{details}{link}`
    pub fn publication_entries(&self) -> Vec<String> {
        self.data
            .publications
            .iter()
            .zip(&self.raw.publications)
            .map(|(p, raw)| {
                let details = join_present(&[p.publisher.as_deref(), p.date.as_deref()], ", ");
                command(
                    "publicationentry",
                    &[&p.title, &details, &entry_link(raw.url.as_deref())],
                )
            })
            .collect()
    }

    /// Certification entries as `\certificationentry{name}{details}{link}`
    pub fn certification_entries(&self) -> Vec<String> {
        self.data
            .certifications
            .iter()
            .zip(&self.raw.certifications)
            .map(|(c, raw)| {
                let details = join_present(&[c.issuer.as_deref(), c.date.as_deref()], ", ");
                command(
                    "certificationentry",
                    &[&c.name, &details, &entry_link(raw.url.as_deref())],
                )
            })
            .collect()
    }

    /// Compile `source` and place the PDF at `output_path`
    pub fn compile(&self, source: &str, output_path: &Path) -> Result<PathBuf, EngineError> {
        compiler::compile_to(
            &self.ctx.compiler,
            &self.ctx.scratch_dir,
            source,
            output_path,
        )
    }
}

/// `\name{a}{b}...`
pub fn command(name: &str, args: &[&str]) -> String {
    let mut out = format!("\\{name}");
    for arg in args {
        out.push('{');
        out.push_str(arg);
        out.push('}');
    }
    out
}

/// Itemized list, empty string when there are no items
pub fn itemize(items: &Lines) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = String::from("\\begin{itemize}\n");
    for item in items.iter() {
        out.push_str("  \\item ");
        out.push_str(item);
        out.push('\n');
    }
    out.push_str("\\end{itemize}");
    out
}

/// Unnumbered section heading
pub fn section(title: &str) -> String {
    command("section*", &[title])
}

/// Join the non-empty parts with `sep`
pub fn join_present(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

/// Skills as a single LaTeX string; categories are bold labels separated by `group_sep`
pub fn skills_text(skills: &Skills, group_sep: &str) -> String {
    match skills {
        Skills::Flat(items) => items.join(", "),
        Skills::Categorized(groups) => groups
            .iter()
            .map(|(category, items)| {
                format!(
                    "{} {}",
                    command("textbf", &[&format!("{}:", escape_str(category))]),
                    items.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join(group_sep),
    }
}

/// Skills section body, `None` when there is nothing to show
pub fn skills_fragment(data: &DocumentData, macro_name: &str, group_sep: &str) -> Option<String> {
    let skills = data.skills.as_ref().filter(|s| !s.is_empty())?;
    Some(command(macro_name, &[&skills_text(skills, group_sep)]))
}

/// `\entrylink{url}` for an unescaped URL, empty when there is none
///
/// The URL ends up inside a macro argument, so `%` and `#` are escaped and
/// characters that would unbalance the argument are percent-encoded.
pub fn entry_link(url: Option<&str>) -> String {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return String::new();
    };
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\\' => out.push_str(r"\%5C"),
            '{' => out.push_str(r"\%7B"),
            '}' => out.push_str(r"\%7D"),
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            c if c.is_whitespace() => out.push_str(r"\%20"),
            c => out.push(c),
        }
    }
    command("entrylink", &[&out])
}

/// Heading followed by entries, or `None` for an empty section
pub fn titled(title: &str, entries: Vec<String>) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let mut out = section(title);
    for entry in entries {
        out.push('\n');
        out.push_str(&entry);
    }
    Some(out)
}
