//! LaTeX escaping for data trees

use serde_json::{Map, Value};

/// Replacement for a LaTeX control character, `None` if it needs no escaping
fn replacement(c: char) -> Option<&'static str> {
    Some(match c {
        '&' => r"\&",
        '%' => r"\%",
        '$' => r"\$",
        '#' => r"\#",
        '_' => r"\_",
        '{' => r"\{",
        '}' => r"\}",
        '~' => r"\textasciitilde{}",
        '^' => r"\textasciicircum{}",
        '\\' => r"\textbackslash{}",
        '<' => r"\textless{}",
        '>' => r"\textgreater{}",
        _ => return None,
    })
}

/// Escape a single string for embedding in LaTeX markup
pub fn escape_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match replacement(c) {
            Some(rep) => out.push_str(rep),
            None => out.push(c),
        }
    }
    out
}

/// Return a copy of `node` with every string leaf escaped
///
/// Object keys and the order of keys and array items are preserved; numbers,
/// booleans and null pass through unchanged. Not idempotent: sanitizing twice
/// escapes the escapes.
pub fn sanitize(node: &Value) -> Value {
    match node {
        Value::String(s) => Value::String(escape_str(s)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), sanitize(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SPECIALS: [char; 12] = ['&', '%', '$', '#', '_', '{', '}', '~', '^', '\\', '<', '>'];

    /// Strip every escape sequence and make sure no special character survives
    fn strip_escapes(s: &str) -> String {
        let mut rest = s.to_string();
        for seq in [
            r"\textasciitilde{}",
            r"\textasciicircum{}",
            r"\textbackslash{}",
            r"\textless{}",
            r"\textgreater{}",
            r"\&",
            r"\%",
            r"\$",
            r"\#",
            r"\_",
            r"\{",
            r"\}",
        ] {
            rest = rest.replace(seq, "");
        }
        rest
    }

    #[test]
    fn test_escape_all_specials() {
        insta::assert_snapshot!(
            escape_str(r"a&b%c$d#e_f{g}h~i^j\k<l>m"),
            @r"a\&b\%c\$d\#e\_f\{g\}h\textasciitilde{}i\textasciicircum{}j\textbackslash{}k\textless{}l\textgreater{}m"
        );
    }

    #[test]
    fn test_no_raw_specials_remain() {
        let input = r"R&D 100% $5 #1 snake_case {x} ~ ^ C:\path <tag>";
        let stripped = strip_escapes(&escape_str(input));
        for c in SPECIALS {
            assert!(!stripped.contains(c), "raw {c:?} left in {stripped:?}");
        }
    }

    #[test]
    fn test_backslash_does_not_disturb_other_escapes() {
        assert_eq!(escape_str(r"\&"), r"\textbackslash{}\&");
    }

    #[test]
    fn test_sanitize_preserves_structure() {
        let tree = json!({
            "personalInfo": {"name": "Tom & Jerry", "email": "t_j@example.com"},
            "years": 5,
            "active": true,
            "missing": null,
            "skills": {"C#": ["50%", "a_b"]},
            "list": ["$", 1.5]
        });
        let out = sanitize(&tree);
        assert_eq!(out["personalInfo"]["name"], json!(r"Tom \& Jerry"));
        assert_eq!(out["personalInfo"]["email"], json!(r"t\_j@example.com"));
        assert_eq!(out["years"], json!(5));
        assert_eq!(out["active"], json!(true));
        assert_eq!(out["missing"], Value::Null);
        assert_eq!(out["skills"]["C#"], json!([r"50\%", r"a\_b"]));
        assert_eq!(out["list"], json!([r"\$", 1.5]));

        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["personalInfo", "years", "active", "missing", "skills", "list"]);
    }

    #[test]
    fn test_sanitize_leaves_input_untouched() {
        let tree = json!({"a": "x&y"});
        let _ = sanitize(&tree);
        assert_eq!(tree, json!({"a": "x&y"}));
    }
}
