//! Binding template identifiers to renderer implementations
//!
//! A variant `<name>` in category `<category>` must be implemented by a
//! renderer called `Capitalize(name) + PascalCase(category) + "Renderer"`,
//! e.g. `classic` / `cover_letter` binds to `ClassicCoverLetterRenderer`.
//! Implementations are registered in a static table at compile time.

use crate::renderer::{
    construct_boxed, ClassicCoverLetterRenderer, ClassicResumeRenderer, RendererFactory,
    TwocolumnResumeRenderer,
};

/// A renderer implementation known to the engine
#[derive(Clone, Copy)]
pub struct Registration {
    pub identifier: &'static str,
    pub factory: RendererFactory,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Every LaTeX renderer that a manifest may bind to
pub static REGISTRATIONS: &[Registration] = &[
    Registration {
        identifier: "ClassicResumeRenderer",
        factory: construct_boxed::<ClassicResumeRenderer>,
    },
    Registration {
        identifier: "TwocolumnResumeRenderer",
        factory: construct_boxed::<TwocolumnResumeRenderer>,
    },
    Registration {
        identifier: "ClassicCoverLetterRenderer",
        factory: construct_boxed::<ClassicCoverLetterRenderer>,
    },
];

/// First letter upper-cased, the rest lower-cased
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `cover_letter` -> `CoverLetter`
fn pascal_case(snake: &str) -> String {
    snake.split('_').map(capitalize).collect()
}

/// Renderer identifier a variant must declare
pub fn expected_identifier(category: &str, name: &str) -> String {
    format!("{}{}Renderer", capitalize(name), pascal_case(category))
}

/// Look up a registered implementation by identifier
pub fn lookup(identifier: &str) -> Option<&'static Registration> {
    REGISTRATIONS.iter().find(|r| r.identifier == identifier)
}

/// Registered identifiers whose suffix matches `category`
pub fn registered_for(category: &str) -> Vec<String> {
    let suffix = format!("{}Renderer", pascal_case(category));
    REGISTRATIONS
        .iter()
        .map(|r| r.identifier)
        .filter(|id| id.ends_with(&suffix))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expected_identifier() {
        assert_eq!(expected_identifier("resume", "classic"), "ClassicResumeRenderer");
        assert_eq!(
            expected_identifier("cover_letter", "classic"),
            "ClassicCoverLetterRenderer"
        );
        assert_eq!(
            expected_identifier("resume", "twoColumn"),
            "TwocolumnResumeRenderer"
        );
    }

    #[test]
    fn test_capitalize_edge_cases() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("a"), "A");
        assert_eq!(capitalize("MODERN"), "Modern");
    }

    #[test]
    fn test_every_registration_is_reachable() {
        for registration in REGISTRATIONS {
            assert!(lookup(registration.identifier).is_some());
        }
        assert!(lookup("ModernResumeRenderer").is_none());
    }

    #[test]
    fn test_registered_for_category() {
        assert_eq!(
            registered_for("resume"),
            vec![
                "ClassicResumeRenderer".to_string(),
                "TwocolumnResumeRenderer".to_string()
            ]
        );
        assert_eq!(
            registered_for("cover_letter"),
            vec!["ClassicCoverLetterRenderer".to_string()]
        );
    }
}
