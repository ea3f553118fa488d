//! Request and document data model
//!
//! The pipeline moves data around as a generic `serde_json::Value` tree so the
//! escaper can walk it without knowing its shape. Renderers deserialize the
//! (possibly sanitized) tree into [`DocumentData`] leniently; the stricter
//! checks a web layer would run before handing data to the engine live in
//! [`DocumentData::validate`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}(-\d{2})?$").expect("date pattern is valid"));

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid"));

/// Literal accepted in place of an end date for ongoing positions
pub const PRESENT: &str = "Present";

/// Kind of document being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Resume,
    CoverLetter,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::CoverLetter => "cover_letter",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(Self::Resume),
            "cover_letter" => Ok(Self::CoverLetter),
            other => Err(EngineError::validation(format!(
                "unknown document type '{other}' (expected resume or cover_letter)"
            ))),
        }
    }
}

/// Binary artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Docx,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            other => Err(EngineError::validation(format!(
                "unknown output format '{other}' (expected pdf or docx)"
            ))),
        }
    }
}

fn default_clean_up() -> bool {
    true
}

/// A single render request as handed over by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub document_type: DocumentType,
    pub template: String,
    #[serde(default)]
    pub format: OutputFormat,
    pub data: Value,
    #[serde(default = "default_clean_up")]
    pub clean_up: bool,
}

impl DocumentRequest {
    pub fn new(
        document_type: DocumentType,
        template: impl Into<String>,
        format: OutputFormat,
        data: Value,
    ) -> Self {
        Self {
            document_type,
            template: template.into(),
            format,
            data,
            clean_up: true,
        }
    }

    /// Keep or remove the artifact once the caller drops it
    pub fn with_clean_up(mut self, clean_up: bool) -> Self {
        self.clean_up = clean_up;
        self
    }
}

/// A list of strings that may arrive as a single string or `null`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct Lines(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<String>),
    One(String),
    None,
}

impl From<OneOrMany> for Lines {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::Many(items) => Lines(items),
            OneOrMany::One(item) => Lines(vec![item]),
            OneOrMany::None => Lines::default(),
        }
    }
}

impl Lines {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

impl PersonalInfo {
    /// Non-empty contact fields in display order
    pub fn contact_parts(&self) -> Vec<&str> {
        [
            Some(self.email.as_str()),
            self.phone.as_deref(),
            self.location.as_deref(),
            self.website.as_deref(),
            self.linkedin.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub details: Lines,
}

impl ExperienceItem {
    /// "start -- end", with an open end rendered as `Present`
    pub fn date_range(&self, separator: &str) -> String {
        let end = self.end_date.as_deref().unwrap_or(PRESENT);
        format!("{}{}{}", self.start_date, separator, end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "graduationYear")]
    pub date: Option<String>,
    #[serde(default)]
    pub details: Lines,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Lines,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "achievements")]
    pub details: Lines,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationItem {
    pub title: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationItem {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Skills as a flat list or grouped by category (category order preserved)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    Flat(Vec<String>),
    Categorized(IndexMap<String, Lines>),
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat(items) => items.is_empty(),
            Self::Categorized(groups) => groups.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Lines,
}

impl Recipient {
    /// Non-empty recipient lines, top to bottom
    pub fn lines(&self) -> Vec<&str> {
        [
            self.name.as_deref(),
            self.title.as_deref(),
            self.company.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(self.address.iter())
        .filter(|line| !line.is_empty())
        .collect()
    }
}

/// Typed view of a résumé or cover-letter data tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    #[serde(rename = "personalInfo")]
    pub personal_info: PersonalInfo,
    #[serde(default, alias = "professional_summary")]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub projects: Vec<ProjectItem>,
    #[serde(default, alias = "articles_and_publications")]
    pub publications: Vec<PublicationItem>,
    #[serde(default)]
    pub certifications: Vec<CertificationItem>,
    #[serde(default, alias = "technologies_and_skills")]
    pub skills: Option<Skills>,

    #[serde(default)]
    pub recipient: Option<Recipient>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub salutation: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub paragraphs: Lines,
    #[serde(default)]
    pub closing: Option<String>,
}

impl DocumentData {
    /// Deserialize a tree, requiring `personalInfo` to be present
    pub fn from_value(value: &Value) -> Result<Self, EngineError> {
        require_personal_info(value)?;
        serde_json::from_value(value.clone())
            .map_err(|e| EngineError::validation(format!("malformed document data: {e}")))
    }

    /// Checks a web layer performs before handing data to the engine
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.personal_info.name.trim().is_empty() {
            return Err(EngineError::validation("personalInfo.name must not be empty"));
        }
        if !EMAIL_SHAPE.is_match(&self.personal_info.email) {
            return Err(EngineError::validation(format!(
                "invalid email address: {}",
                self.personal_info.email
            )));
        }
        for (idx, item) in self.experience.iter().enumerate() {
            check_date(&item.start_date).map_err(|e| {
                EngineError::validation(format!("experience[{idx}].startDate: {e}"))
            })?;
            if let Some(end) = item.end_date.as_deref() {
                if end != PRESENT {
                    check_date(end).map_err(|e| {
                        EngineError::validation(format!("experience[{idx}].endDate: {e}"))
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Cover-letter body paragraphs: explicit list first, else `content` split on blank lines
    pub fn letter_paragraphs(&self) -> Vec<String> {
        if !self.paragraphs.is_empty() {
            return self.paragraphs.0.clone();
        }
        self.content
            .as_deref()
            .map(|content| {
                content
                    .split("\n\n")
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Reduce a person name to a file name stem
///
/// Anything other than alphanumerics, `.`, `-` and `_` becomes `_`, and
/// leading dots are dropped. The result is always a single path component.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "output".to_string()
    } else {
        stem.to_string()
    }
}

/// Fail with `MissingSection` unless the tree has a `personalInfo` object
pub fn require_personal_info(value: &Value) -> Result<(), EngineError> {
    match value.get("personalInfo") {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(EngineError::missing_section("personalInfo")),
    }
}

/// Accept `YYYY-MM` or `YYYY-MM-DD` naming a real calendar date
pub fn check_date(value: &str) -> Result<(), String> {
    if !DATE_SHAPE.is_match(value) {
        return Err(format!(
            "invalid date format: {value}. Use YYYY-MM or YYYY-MM-DD"
        ));
    }
    let full = if value.len() == 7 {
        format!("{value}-01")
    } else {
        value.to_string()
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("invalid calendar date: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "personalInfo": {"name": "Jane Roe", "email": "jane@example.com"},
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "startDate": "2020-01",
                "endDate": "Present",
                "details": ["Built X"]
            }]
        })
    }

    #[test]
    fn test_from_value_reads_camel_case_fields() {
        let data = DocumentData::from_value(&sample()).unwrap();
        assert_eq!(data.personal_info.name, "Jane Roe");
        assert_eq!(data.experience[0].start_date, "2020-01");
        assert_eq!(data.experience[0].details, Lines(vec!["Built X".to_string()]));
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_missing_personal_info() {
        let err = DocumentData::from_value(&json!({"experience": []})).unwrap_err();
        assert!(matches!(err, EngineError::MissingSection { ref section } if section == "personalInfo"));
    }

    #[test]
    fn test_single_string_details_normalized() {
        let mut tree = sample();
        tree["experience"][0]["details"] = json!("Shipped Y");
        let data = DocumentData::from_value(&tree).unwrap();
        assert_eq!(data.experience[0].details.0, vec!["Shipped Y".to_string()]);
    }

    #[test]
    fn test_null_details_become_empty() {
        let mut tree = sample();
        tree["experience"][0]["details"] = Value::Null;
        let data = DocumentData::from_value(&tree).unwrap();
        assert!(data.experience[0].details.is_empty());
    }

    #[test]
    fn test_wrong_date_separator_rejected() {
        let mut tree = sample();
        tree["experience"][0]["startDate"] = json!("2022/01");
        let data = DocumentData::from_value(&tree).unwrap();
        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("startDate"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_check_date() {
        assert!(check_date("2020-01").is_ok());
        assert!(check_date("2020-02-29").is_ok());
        assert!(check_date("2021-02-29").is_err());
        assert!(check_date("2020-13").is_err());
        assert!(check_date("2020-1").is_err());
        assert!(check_date("Present").is_err());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut tree = sample();
        tree["personalInfo"]["email"] = json!("not-an-email");
        let data = DocumentData::from_value(&tree).unwrap();
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_legacy_field_aliases() {
        let tree = json!({
            "personalInfo": {"name": "A", "email": "a@b.co"},
            "professional_summary": "Summary",
            "technologies_and_skills": {"Languages": ["Rust", "Go"], "Tools": "Git"}
        });
        let data = DocumentData::from_value(&tree).unwrap();
        assert_eq!(data.summary.as_deref(), Some("Summary"));
        match data.skills {
            Some(Skills::Categorized(groups)) => {
                let keys: Vec<_> = groups.keys().cloned().collect();
                assert_eq!(keys, vec!["Languages".to_string(), "Tools".to_string()]);
                assert_eq!(groups["Tools"].0, vec!["Git".to_string()]);
            }
            other => panic!("expected categorized skills, got {other:?}"),
        }
    }

    #[test]
    fn test_letter_paragraphs_split_content() {
        let tree = json!({
            "personalInfo": {"name": "A", "email": "a@b.co"},
            "content": "First paragraph.\n\nSecond paragraph.\n\n"
        });
        let data = DocumentData::from_value(&tree).unwrap();
        assert_eq!(
            data.letter_paragraphs(),
            vec!["First paragraph.".to_string(), "Second paragraph.".to_string()]
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: DocumentRequest = serde_json::from_value(json!({
            "document_type": "cover_letter",
            "template": "classic",
            "data": {}
        }))
        .unwrap();
        assert_eq!(request.document_type, DocumentType::CoverLetter);
        assert_eq!(request.format, OutputFormat::Pdf);
        assert!(request.clean_up);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Jane Roe"), "Jane_Roe");
        assert_eq!(file_stem("  José Núñez "), "José_Núñez");
        assert_eq!(file_stem("x/../../../tmp/pwned"), "x_.._.._.._tmp_pwned");
        assert_eq!(file_stem("../etc"), "_etc");
        assert_eq!(file_stem(r"C:\Users\a"), "C__Users_a");
        assert_eq!(file_stem("..."), "output");
        assert_eq!(file_stem(""), "output");
    }
}
