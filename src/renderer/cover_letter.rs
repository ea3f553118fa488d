//! Classic cover letter

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::EngineError;
use crate::model::DocumentData;

use super::latex::{command, LatexInput};
use super::{Body, RenderContext, Renderer};

const DEFAULT_SALUTATION: &str = "Dear Hiring Manager,";
const DEFAULT_CLOSING: &str = "Sincerely,";

/// LaTeX line break between stacked address lines
const LINE_BREAK: &str = " \\\\\n";

pub struct ClassicCoverLetterRenderer {
    input: LatexInput,
}

impl ClassicCoverLetterRenderer {
    fn data(&self) -> &DocumentData {
        &self.input.data
    }

    fn fragments(&self) -> HashMap<&'static str, String> {
        let data = self.data();
        let info = &data.personal_info;

        let contact = info.contact_parts().join(LINE_BREAK);
        let date = data
            .date
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("\\today");
        let recipient = data
            .recipient
            .as_ref()
            .map(|r| r.lines())
            .filter(|lines| !lines.is_empty())
            .map(|lines| command("recipientblock", &[&lines.join(LINE_BREAK)]))
            .unwrap_or_default();
        let salutation = data
            .salutation
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SALUTATION);
        let closing = data
            .closing
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CLOSING);

        HashMap::from([
            ("personalinfo", command("senderheader", &[&info.name])),
            ("contact", command("sendercontact", &[&contact])),
            ("date", command("letterdate", &[date])),
            ("recipient", recipient),
            ("salutation", command("salutation", &[salutation])),
            ("body", data.letter_paragraphs().join("\n\n")),
            ("closing", command("signoff", &[closing, &info.name])),
        ])
    }
}

impl Renderer for ClassicCoverLetterRenderer {
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
