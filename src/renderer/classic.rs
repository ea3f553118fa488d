//! Classic single-column résumé

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::EngineError;
use crate::model::DocumentData;

use super::latex::{self, command, itemize, join_present, titled, LatexInput};
use super::{Body, RenderContext, Renderer};

/// Separator between contact items on the header line
const CONTACT_SEP: &str = r" \textbar{} ";

pub struct ClassicResumeRenderer {
    input: LatexInput,
}

impl ClassicResumeRenderer {
    fn data(&self) -> &DocumentData {
        &self.input.data
    }

    fn personal_info(&self) -> String {
        command("personalheader", &[&self.data().personal_info.name])
    }

    fn contact(&self) -> Option<String> {
        let parts = self.data().personal_info.contact_parts();
        if parts.is_empty() {
            return None;
        }
        Some(command("contactline", &[&parts.join(CONTACT_SEP)]))
    }

    fn summary(&self) -> Option<String> {
        let summary = self.data().summary.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("{}\n{}", latex::section("Summary"), summary))
    }

    fn experience(&self) -> Option<String> {
        let entries = self
            .data()
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
        titled("Experience", entries)
    }

    fn education(&self) -> Option<String> {
        let entries = self
            .data()
            .education
            .iter()
            .map(|edu| {
                let mut entry = command(
                    "educationentry",
                    &[
                        &edu.degree,
                        &edu.institution,
                        edu.date.as_deref().unwrap_or(""),
                        edu.location.as_deref().unwrap_or(""),
                    ],
                );
                let details = itemize(&edu.details);
                if !details.is_empty() {
                    entry.push('\n');
                    entry.push_str(&details);
                }
                entry
            })
            .collect();
        titled("Education", entries)
    }

    fn projects(&self) -> Option<String> {
        let entries = self
            .data()
            .projects
            .iter()
            .map(|proj| {
                let technologies = proj.technologies.join(", ");
                let mut entry = command(
                    "projectentry",
                    &[
                        &proj.name,
                        &technologies,
                        &join_present(
                            &[proj.description.as_deref(), proj.url.as_deref()],
                            r" \newline ",
                        ),
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
        titled("Projects", entries)
    }

    fn skills(&self) -> Option<String> {
        let body = latex::skills_fragment(self.data(), "skillsline", r" \\ ")?;
        Some(format!("{}\n{}", latex::section("Skills"), body))
    }

    fn fragments(&self) -> HashMap<&'static str, String> {
        let sections = [
            ("personalinfo", Some(self.personal_info())),
            ("contact", self.contact()),
            ("summary", self.summary()),
            ("experience", self.experience()),
            ("education", self.education()),
            ("projects", self.projects()),
            ("skills", self.skills()),
            (
                "publications",
                titled("Publications", self.input.publication_entries()),
            ),
            (
                "certifications",
                titled("Certifications", self.input.certification_entries()),
            ),
        ];
        sections
            .into_iter()
            .map(|(name, fragment)| (name, fragment.unwrap_or_default()))
            .collect()
    }
}

impl Renderer for ClassicResumeRenderer {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn templates_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/resume/classic")
    }

    fn render(data: Value) -> String {
        let ctx = RenderContext::new(templates_dir(), &EngineConfig::default());
        let renderer = ClassicResumeRenderer::construct(ctx, data).expect("Should construct");
        renderer.generate().as_markup().unwrap().to_string()
    }

    #[test]
    fn test_minimal_resume() {
        let tex = render(json!({
            "personalInfo": {"name": "Jane Roe", "email": "jane@example.com"},
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "startDate": "2020-01",
                "endDate": "Present",
                "details": ["Built X"]
            }]
        }));
        assert!(tex.contains(r"\personalheader{Jane Roe}"));
        assert!(tex.contains(r"\contactline{jane@example.com}"));
        assert!(tex.contains(r"\experienceentry{Engineer}{Acme}{2020-01 -- Present}{}"));
        assert!(tex.contains(r"\item Built X"));
        assert!(!tex.contains(r"\section*{Education}"));
        assert!(!tex.contains(r"\section*{Summary}"));
        assert!(!tex.contains(r"\newcommand{\experiencesection}{}"));
    }

    #[test]
    fn test_section_order() {
        let tex = render(json!({
            "personalInfo": {"name": "A", "email": "a@b.co", "phone": "555"},
            "summary": "Hello",
            "experience": [{"title": "T", "company": "C", "startDate": "2020-01", "endDate": "2021-01"}],
            "education": [{"degree": "BSc", "institution": "U", "date": "2019"}],
            "projects": [{"name": "P", "technologies": ["Rust"]}],
            "skills": ["Rust", "SQL"],
            "publications": [{"title": "Paper", "publisher": "ACM"}],
            "certifications": [{"name": "Cert", "issuer": "Org"}]
        }));
        let positions: Vec<usize> = [
            r"\personalheader{A}",
            r"\contactline{a@b.co",
            r"\section*{Summary}",
            r"\section*{Experience}",
            r"\section*{Education}",
            r"\section*{Projects}",
            r"\section*{Skills}",
            r"\section*{Publications}",
            r"\section*{Certifications}",
        ]
        .iter()
        .map(|needle| tex.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert!(tex.contains(r"\contactline{a@b.co \textbar{} 555}"));
        assert!(tex.contains(r"\skillsline{Rust, SQL}"));
        assert!(tex.contains(r"\publicationentry{Paper}{ACM}{}"));
    }

    #[test]
    fn test_content_is_escaped() {
        let tex = render(json!({
            "personalInfo": {"name": "Tom & Jerry", "email": "tj@example.com"},
            "experience": [{
                "title": "R&D",
                "company": "50% Co",
                "startDate": "2020-01",
                "details": "Cut costs by $5"
            }]
        }));
        assert!(tex.contains(r"\personalheader{Tom \& Jerry}"));
        assert!(tex.contains(r"\experienceentry{R\&D}{50\% Co}{2020-01 -- Present}{}"));
        assert!(tex.contains(r"\item Cut costs by \$5"));
    }

    #[test]
    fn test_project_details_and_links() {
        let tex = render(json!({
            "personalInfo": {"name": "A", "email": "a@b.co"},
            "projects": [{
                "name": "Forge",
                "technologies": ["Rust"],
                "achievements": ["Shipped v1", "Cut build time by 40%"]
            }],
            "publications": [
                {"title": "Paper", "url": "https://example.com/a_b"},
                {"title": "Offline"}
            ]
        }));
        assert!(tex.contains(
            "\\projectentry{Forge}{Rust}{}\n\\begin{itemize}\n  \\item Shipped v1\n  \\item Cut build time by 40\\%\n\\end{itemize}"
        ));
        assert!(tex.contains(r"\publicationentry{Paper}{}{\entrylink{https://example.com/a_b}}"));
        assert!(tex.contains(r"\publicationentry{Offline}{}{}"));
        assert!(!tex.contains(r"a\_b"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let data = json!({"personalInfo": {"name": "A", "email": "a@b.co"}, "skills": {"X": ["y"]}});
        assert_eq!(render(data.clone()), render(data));
    }

    #[test]
    fn test_missing_personal_info() {
        let ctx = RenderContext::new(templates_dir(), &EngineConfig::default());
        let result = ClassicResumeRenderer::construct(ctx, json!({"summary": "x"}));
        assert!(matches!(result, Err(EngineError::MissingSection { .. })));
    }

    #[test]
    fn test_unreadable_skeleton() {
        let ctx = RenderContext::new("/nonexistent/classic", &EngineConfig::default());
        let result = ClassicResumeRenderer::construct(
            ctx,
            json!({"personalInfo": {"name": "A", "email": "a@b.co"}}),
        );
        assert!(matches!(result, Err(EngineError::Io { .. })));
    }
}
