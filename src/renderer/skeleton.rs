//! Skeleton loading and placeholder substitution
//!
//! A skeleton is a complete LaTeX document containing placeholder lines of the
//! form `\newcommand{\experiencesection}{}`. Each placeholder names a section;
//! substitution swaps the whole line for the generated fragment. A placeholder
//! nobody fills stays in place, where it harmlessly defines an empty macro.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use logos::Logos;

use crate::error::EngineError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    /// Control word such as `\newcommand`
    #[regex(r"\\[a-zA-Z@]+")]
    Command,

    /// Control symbol such as `\%` or `\\`
    #[regex(r"\\[^a-zA-Z@]")]
    Symbol,

    #[regex(r"[^\\]+")]
    Text,
}

const DEFINE: &str = "\\newcommand";

/// Length of the placeholder tail (`{\experiencesection}{}`) at the start of
/// `rest`, together with its section name
fn placeholder_tail(rest: &str) -> Option<(usize, &str)> {
    let inner = rest.strip_prefix("{\\")?;
    let word_len = inner
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(inner.len());
    let word = &inner[..word_len];
    inner[word_len..].strip_prefix("}{}")?;
    let name = word.strip_suffix("section").filter(|name| !name.is_empty())?;
    Some((word_len + "{\\}{}".len(), name))
}

/// Walk the skeleton, calling `visit` with each verbatim slice and each
/// placeholder (full text plus section name)
fn walk<'s>(source: &'s str, mut visit: impl FnMut(&'s str, Option<&'s str>)) {
    let mut lexer = Piece::lexer(source);
    while let Some(piece) = lexer.next() {
        let slice = lexer.slice();
        if piece == Ok(Piece::Command) && slice == DEFINE {
            if let Some((len, name)) = placeholder_tail(lexer.remainder()) {
                let start = lexer.span().start;
                lexer.bump(len);
                visit(&source[start..lexer.span().end], Some(name));
                continue;
            }
        }
        visit(slice, None);
    }
}

/// Placeholder text for a section name
pub fn placeholder(section: &str) -> String {
    format!("\\newcommand{{\\{section}section}}{{}}")
}

/// A loaded LaTeX skeleton
#[derive(Debug, Clone)]
pub struct Skeleton {
    path: PathBuf,
    source: String,
}

impl Skeleton {
    /// Read a skeleton from disk
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            path: PathBuf::new(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Section names of all placeholders in document order
    pub fn sections(&self) -> Vec<&str> {
        let mut names = Vec::new();
        walk(&self.source, |_, name| names.extend(name));
        names
    }

    /// Replace placeholders with the fragments keyed by section name
    ///
    /// Runs one pass over the skeleton. Each section is substituted at most
    /// once; repeated or unknown placeholders are copied verbatim.
    pub fn fill(&self, fragments: &HashMap<&str, String>) -> String {
        let extra: usize = fragments.values().map(String::len).sum();
        let mut out = String::with_capacity(self.source.len() + extra);
        let mut used = HashSet::new();

        walk(&self.source, |slice, name| {
            let fragment = name
                .filter(|name| used.insert(*name))
                .and_then(|name| fragments.get(name));
            out.push_str(fragment.map_or(slice, String::as_str));
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SKELETON: &str = r"\documentclass{article}
\newcommand{\resumeitem}[1]{\item #1}
\begin{document}
\newcommand{\personalinfosection}{}
\newcommand{\summarysection}{}
\newcommand{\experiencesection}{}
\end{document}
";

    #[test]
    fn test_sections_in_order() {
        let skeleton = Skeleton::from_source(SKELETON);
        assert_eq!(skeleton.sections(), vec!["personalinfo", "summary", "experience"]);
    }

    #[test]
    fn test_fill_replaces_known_and_keeps_unknown() {
        let skeleton = Skeleton::from_source(SKELETON);
        let mut fragments = HashMap::new();
        fragments.insert("personalinfo", r"\name{Jane}".to_string());
        fragments.insert("experience", String::new());
        fragments.insert("publications", "never used".to_string());

        let out = skeleton.fill(&fragments);
        assert!(out.contains(r"\name{Jane}"));
        assert!(!out.contains(r"\newcommand{\personalinfosection}{}"));
        assert!(!out.contains(r"\newcommand{\experiencesection}{}"));
        assert!(out.contains(r"\newcommand{\summarysection}{}"));
        assert!(out.contains(r"\newcommand{\resumeitem}[1]{\item #1}"));
        assert!(!out.contains("never used"));
    }

    #[test]
    fn test_fill_substitutes_each_placeholder_once() {
        let skeleton = Skeleton::from_source(format!(
            "{}\n{}\n",
            placeholder("summary"),
            placeholder("summary")
        ));
        let mut fragments = HashMap::new();
        fragments.insert("summary", "S".to_string());
        assert_eq!(skeleton.fill(&fragments), "S\n\\newcommand{\\summarysection}{}\n");
    }

    #[test]
    fn test_fill_without_fragments_is_identity() {
        let skeleton = Skeleton::from_source(SKELETON);
        assert_eq!(skeleton.fill(&HashMap::new()), SKELETON);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Skeleton::load(Path::new("/nonexistent/template.tex")).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
