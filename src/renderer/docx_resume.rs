//! Word résumé built from structural blocks
//!
//! Unlike the LaTeX variants this renderer does not sanitize its input: the
//! document builder escapes text for XML when it writes the package.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::EngineError;
use crate::model::{self, DocumentData, Lines, Skills};

use super::docx::{Block, DocumentBuilder, Run};
use super::{Body, RenderContext, Renderer};

/// Separator between start and end dates
const DATE_SEP: &str = " \u{2013} ";

pub struct DocxResumeRenderer {
    ctx: RenderContext,
    data: DocumentData,
}

fn bullets(out: &mut Vec<Block>, items: &Lines) {
    out.extend(items.iter().map(Block::bullet));
}

/// Heading, the section's blocks, then a spacer; nothing for an empty section
fn section(out: &mut Vec<Block>, title: &str, body: Vec<Block>) {
    if body.is_empty() {
        return;
    }
    out.push(Block::heading(1, title));
    out.extend(body);
    out.push(Block::spacer());
}

/// Bold name, optional "(a, b)" details and an italic link suffix
fn credential(name: &str, details: &[Option<&str>], link: Option<(&str, &str)>) -> Block {
    let mut runs = vec![Run::new(name).bold()];
    let details: Vec<&str> = details.iter().flatten().copied().filter(|d| !d.is_empty()).collect();
    if !details.is_empty() {
        runs.push(Run::new(format!(" ({})", details.join(", "))));
    }
    if let Some((label, url)) = link.filter(|(_, url)| !url.is_empty()) {
        runs.push(Run::new(format!(" - {label}: {url}")).italic());
    }
    Block::runs(runs)
}

impl DocxResumeRenderer {
    fn header(&self, out: &mut Vec<Block>) {
        let info = &self.data.personal_info;
        if !info.name.is_empty() {
            out.push(Block::runs(vec![Run::new(&info.name).bold().size(24)]).centered());
        }
        let contact = info.contact_parts();
        if !contact.is_empty() {
            out.push(
                Block::paragraph(contact.join(" | "))
                    .centered()
                    .space_after(18),
            );
        }
    }

    fn experience(&self) -> Vec<Block> {
        let mut body = Vec::new();
        for exp in &self.data.experience {
            body.push(Block::heading(2, &exp.company));
            let mut runs = vec![Run::new(format!(
                "{} ({})",
                exp.title,
                exp.date_range(DATE_SEP)
            ))];
            if let Some(location) = exp.location.as_deref().filter(|l| !l.is_empty()) {
                runs.push(Run::new(format!(" | {location}")).italic());
            }
            body.push(Block::runs(runs));
            bullets(&mut body, &exp.details);
            body.push(Block::spacer());
        }
        body
    }

    fn education(&self) -> Vec<Block> {
        let mut body = Vec::new();
        for edu in &self.data.education {
            body.push(Block::heading(2, &edu.institution));
            let mut runs = vec![Run::new(&edu.degree).bold()];
            if let Some(date) = edu.date.as_deref().filter(|d| !d.is_empty()) {
                runs.push(Run::new(format!(" ({date})")));
            }
            body.push(Block::runs(runs));
            bullets(&mut body, &edu.details);
            body.push(Block::spacer());
        }
        body
    }

    fn projects(&self) -> Vec<Block> {
        let mut body = Vec::new();
        for proj in &self.data.projects {
            body.push(Block::heading(2, &proj.name));
            if !proj.technologies.is_empty() {
                body.push(Block::runs(vec![
                    Run::new("Technologies: ").italic(),
                    Run::new(proj.technologies.join(", ")),
                ]));
            }
            if let Some(description) = proj.description.as_deref().filter(|d| !d.is_empty()) {
                body.push(Block::paragraph(description));
            }
            bullets(&mut body, &proj.details);
            body.push(Block::spacer());
        }
        body
    }

    fn skills(&self) -> Vec<Block> {
        match &self.data.skills {
            Some(Skills::Flat(items)) => items.iter().map(Block::bullet).collect(),
            Some(Skills::Categorized(groups)) => groups
                .iter()
                .map(|(category, items)| Block::paragraph(format!("{category}: {}", items.join(", "))))
                .collect(),
            None => Vec::new(),
        }
    }

    fn blocks(&self) -> Vec<Block> {
        let data = &self.data;
        let mut out = Vec::new();
        self.header(&mut out);

        if let Some(summary) = data.summary.as_deref().filter(|s| !s.is_empty()) {
            section(&mut out, "Professional Summary", vec![Block::paragraph(summary)]);
        }
        section(&mut out, "Experience", self.experience());
        section(&mut out, "Education", self.education());
        section(&mut out, "Projects", self.projects());
        section(&mut out, "Skills", self.skills());
        section(
            &mut out,
            "Articles & Publications",
            data.publications
                .iter()
                .map(|p| {
                    credential(
                        &p.title,
                        &[p.publisher.as_deref(), p.date.as_deref()],
                        p.url.as_deref().map(|url| ("Available at", url)),
                    )
                })
                .collect(),
        );
        section(
            &mut out,
            "Certifications",
            data.certifications
                .iter()
                .map(|c| {
                    credential(
                        &c.name,
                        &[c.issuer.as_deref(), c.date.as_deref()],
                        c.url.as_deref().map(|url| ("Verify at", url)),
                    )
                })
                .collect(),
        );
        out
    }
}

impl Renderer for DocxResumeRenderer {
    fn construct(ctx: RenderContext, data: Value) -> Result<Self, EngineError> {
        model::require_personal_info(&data)?;
        let data = DocumentData::from_value(&data)?;
        Ok(Self { ctx, data })
    }

    fn generate(&self) -> Body {
        Body::Blocks(self.blocks())
    }

    fn export(&self, output_path: &Path) -> Result<PathBuf, EngineError> {
        let mut builder = DocumentBuilder::new(&self.ctx.docx);
        builder.extend(self.blocks());
        builder.save(output_path)?;
        debug!(
            output = %output_path.display(),
            blocks = builder.blocks().len(),
            "wrote docx"
        );
        Ok(output_path.to_path_buf())
    }
}
