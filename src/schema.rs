//! Expected data shape for each document type
//!
//! The schema describes what [`DocumentData`](crate::DocumentData) accepts,
//! paired with a minimal example a caller can start from.

use serde_json::{json, Value};

use crate::model::DocumentType;

fn string() -> Value {
    json!({"type": "string"})
}

/// A string or a list of strings
fn lines() -> Value {
    json!({"oneOf": [string(), {"type": "array", "items": string()}]})
}

fn list_of(required: &[&str], properties: Value) -> Value {
    json!({
        "type": "array",
        "items": {"type": "object", "required": required, "properties": properties}
    })
}

fn personal_info(extended: bool) -> Value {
    let mut properties = json!({"name": string(), "email": string()});
    if extended {
        for field in ["phone", "location", "website", "linkedin"] {
            properties[field] = string();
        }
    }
    json!({"type": "object", "required": ["name", "email"], "properties": properties})
}

fn resume_schema() -> Value {
    json!({
        "type": "object",
        "required": ["personalInfo"],
        "properties": {
            "personalInfo": personal_info(true),
            "summary": string(),
            "experience": list_of(&["title", "company", "startDate"], json!({
                "title": string(),
                "company": string(),
                "location": string(),
                "startDate": {"type": "string", "pattern": "^\\d{4}-\\d{2}(-\\d{2})?$"},
                "endDate": string(),
                "details": lines()
            })),
            "education": list_of(&["degree", "institution"], json!({
                "degree": string(),
                "institution": string(),
                "location": string(),
                "date": string(),
                "details": lines()
            })),
            "projects": list_of(&["name"], json!({
                "name": string(),
                "description": string(),
                "technologies": lines(),
                "url": string(),
                "details": lines()
            })),
            "publications": list_of(&["title"], json!({
                "title": string(),
                "publisher": string(),
                "date": string(),
                "url": string()
            })),
            "certifications": list_of(&["name"], json!({
                "name": string(),
                "issuer": string(),
                "date": string(),
                "url": string()
            })),
            "skills": {
                "oneOf": [
                    {"type": "array", "items": string()},
                    {"type": "object", "additionalProperties": lines()}
                ]
            }
        }
    })
}

fn cover_letter_schema() -> Value {
    json!({
        "type": "object",
        "required": ["personalInfo", "content"],
        "properties": {
            "personalInfo": personal_info(false),
            "content": string(),
            "paragraphs": lines(),
            "recipient": {
                "type": "object",
                "properties": {
                    "name": string(),
                    "title": string(),
                    "company": string(),
                    "address": lines()
                }
            },
            "date": string(),
            "salutation": string(),
            "closing": string()
        }
    })
}

/// `{"schema": ..., "example": ...}` for `document_type`
pub fn schema(document_type: DocumentType) -> Value {
    let example_person = json!({"name": "John Doe", "email": "john@example.com"});
    match document_type {
        DocumentType::Resume => json!({
            "schema": resume_schema(),
            "example": {"personalInfo": example_person}
        }),
        DocumentType::CoverLetter => json!({
            "schema": cover_letter_schema(),
            "example": {
                "personalInfo": example_person,
                "content": "Dear Hiring Manager,..."
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentData;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resume_requires_personal_info() {
        let out = schema(DocumentType::Resume);
        assert_eq!(out["schema"]["required"], json!(["personalInfo"]));
        assert_eq!(
            out["schema"]["properties"]["personalInfo"]["required"],
            json!(["name", "email"])
        );
        assert!(out["schema"]["properties"]["personalInfo"]["properties"]["linkedin"].is_object());
        assert!(out["schema"]["properties"]["projects"]["items"]["properties"]["details"].is_object());
    }

    #[test]
    fn test_cover_letter_requires_content() {
        let out = schema(DocumentType::CoverLetter);
        assert_eq!(out["schema"]["required"], json!(["personalInfo", "content"]));
        assert!(out["schema"]["properties"]["personalInfo"]["properties"]["phone"].is_null());
        assert_eq!(out["example"]["content"], "Dear Hiring Manager,...");
    }

    #[test]
    fn test_examples_are_valid_documents() {
        for document_type in [DocumentType::Resume, DocumentType::CoverLetter] {
            let example = &schema(document_type)["example"];
            let data = DocumentData::from_value(example).expect("example parses");
            data.validate().expect("example validates");
            assert_eq!(data.personal_info.name, "John Doe");
        }
    }
}
