//! Two-column résumé: a sidebar for contact, skills and education next to the
//! main column with summary, experience, projects and the rest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::EngineError;
use crate::model::DocumentData;

use super::latex::{self, command, itemize, join_present, LatexInput};
use super::{Body, RenderContext, Renderer};

pub struct TwocolumnResumeRenderer {
    input: LatexInput,
}

/// `\sidebarsection{title}` followed by the body, or `None` when the body is empty
fn sidebar_block(title: &str, lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "{}\n{}",
        command("sidebarsection", &[title]),
        lines.join(" \\\\\n")
    ))
}

impl TwocolumnResumeRenderer {
    fn data(&self) -> &DocumentData {
        &self.input.data
    }

    fn name_header(&self) -> String {
        command("nameheader", &[&self.data().personal_info.name])
    }

    fn left_column(&self) -> String {
        let data = self.data();
        let contact = data
            .personal_info
            .contact_parts()
            .into_iter()
            .map(str::to_string)
            .collect();

        let education = data
            .education
            .iter()
            .map(|edu| {
                let detail = join_present(
                    &[Some(edu.institution.as_str()), edu.date.as_deref()],
                    ", ",
                );
                format!("{} \\\\\n{}", command("textbf", &[&edu.degree]), detail)
            })
            .collect();

        let blocks = [
            sidebar_block("Contact", contact),
            latex::skills_fragment(data, "skillsline", " \\\\\n")
                .map(|body| format!("{}\n{}", command("sidebarsection", &["Skills"]), body)),
            sidebar_block("Education", education),
        ];
        blocks.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
    }

    fn right_column(&self) -> String {
        let data = self.data();
        let mut blocks = Vec::new();

        if let Some(summary) = data.summary.as_deref().filter(|s| !s.is_empty()) {
            blocks.push(format!("{}\n{}", latex::section("Summary"), summary));
        }

        let experience = data
            .experience
            .iter()
            .map(|exp| {
                let mut entry = command(
                    "experienceentry",
                    &[
                        &exp.title,
                        &exp.company,
                        &exp.date_range(" -- "),
                        exp.location.as_deref().unwrap_or(""),
                    ],
                );
                let details = itemize(&exp.details);
                if !details.is_empty() {
                    entry.push('\n');
                    entry.push_str(&details);
                }
                entry
            })
            .collect();

        let projects = data
            .projects
            .iter()
            .map(|proj| {
                let mut entry = command(
                    "projectentry",
                    &[
                        &proj.name,
                        &proj.technologies.join(", "),
                        proj.description.as_deref().unwrap_or(""),
                    ],
                );
                let details = itemize(&proj.details);
                if !details.is_empty() {
                    entry.push('\n');
                    entry.push_str(&details);
                }
                entry
            })
            .collect();

        blocks.extend(
            [
                latex::titled("Experience", experience),
                latex::titled("Projects", projects),
                latex::titled("Publications", self.input.publication_entries()),
                latex::titled("Certifications", self.input.certification_entries()),
            ]
            .into_iter()
            .flatten(),
        );
        blocks.join("\n\n")
    }

    fn fragments(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            ("nameheader", self.name_header()),
            ("leftcolumn", self.left_column()),
            ("rightcolumn", self.right_column()),
        ])
    }
}

impl Renderer for TwocolumnResumeRenderer {
    fn construct(ctx: RenderContext, data: Value) -> Result<Self, EngineError> {
        Ok(Self {
            input: LatexInput::prepare(ctx, data)?,
        })
    }

    fn generate(&self) -> Body {
        Body::Markup(self.input.skeleton.fill(&self.fragments()))
    }

    fn export(&self, output_path: &Path) -> Result<PathBuf, EngineError> {
        let source = self.input.skeleton.fill(&self.fragments());
        self.input.compile(&source, output_path)
    }
}
