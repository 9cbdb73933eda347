//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Parse `/api/users/{username}/profile` style patterns
//! - Match a request path segment by segment
//! - Capture and URL-decode placeholder values
//!
//! # Design Decisions
//! - Method comparison is case-insensitive; the method is stored upper-cased
//! - Path matching is case-sensitive unless the table is built otherwise
//! - A placeholder captures exactly one segment, possibly empty
//! - Trailing slashes are significant
//! - No regex: each segment is a literal or a single placeholder with
//!   optional literal text on either side

use std::fmt;

use percent_encoding::percent_decode_str;

/// Error raised when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid method `{0}`")]
    InvalidMethod(String),
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),
    #[error("pattern `{0}` has unbalanced braces")]
    UnbalancedBrace(String),
    #[error("pattern `{0}` has an empty placeholder name")]
    EmptyParam(String),
    #[error("pattern `{pattern}` has more than one placeholder in segment `{segment}`")]
    MultipleParamsInSegment { pattern: String, segment: String },
    #[error("pattern `{pattern}` repeats placeholder `{name}`")]
    DuplicateParam { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { prefix: String, suffix: String },
}

/// A compiled `(method, path pattern)` pair.
#[derive(Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    method: String,
    pattern: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
    case_insensitive: bool,
}

impl RouteTemplate {
    /// Compile a template. Literal segments compare exactly unless
    /// `case_insensitive` is set.
    pub fn compile(method: &str, pattern: &str, case_insensitive: bool) -> Result<Self, RouteError> {
        let method = method.trim();
        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(RouteError::InvalidMethod(method.to_string()));
        }
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(pattern.to_string()));
        }

        let mut param_names = Vec::new();
        let segments = pattern
            .split('/')
            .map(|raw| parse_segment(pattern, raw, &mut param_names))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            method: method.to_ascii_uppercase(),
            pattern: pattern.to_string(),
            segments,
            param_names,
            case_insensitive,
        })
    }

    /// Upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The pattern as registered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in the order they appear.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns true if `method` names this template's method, ignoring case.
    pub fn matches_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }

    /// Match `path` and return the raw (still encoded) placeholder captures
    /// in declaration order, or `None` if the path does not fit.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let mut captures = Vec::with_capacity(self.param_names.len());
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if !self.text_eq(literal, part) {
                        return None;
                    }
                }
                Segment::Param { prefix, suffix } => {
                    if part.len() < prefix.len() + suffix.len() {
                        return None;
                    }
                    let head = part.get(..prefix.len())?;
                    let tail = part.get(part.len() - suffix.len()..)?;
                    if !self.text_eq(prefix, head) || !self.text_eq(suffix, tail) {
                        return None;
                    }
                    captures.push(part.get(prefix.len()..part.len() - suffix.len())?);
                }
            }
        }

        // Anchored: the path may not have segments left over.
        if parts.next().is_some() {
            return None;
        }
        Some(captures)
    }

    /// Match `path` and return decoded `(name, value)` pairs.
    pub fn extract(&self, path: &str) -> Option<Vec<(String, String)>> {
        let captures = self.captures(path)?;
        Some(
            self.param_names
                .iter()
                .cloned()
                .zip(captures.into_iter().map(url_decode))
                .collect(),
        )
    }

    fn text_eq(&self, expected: &str, actual: &str) -> bool {
        if self.case_insensitive {
            expected.eq_ignore_ascii_case(actual)
        } else {
            expected == actual
        }
    }
}

impl fmt::Debug for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

fn parse_segment(pattern: &str, raw: &str, names: &mut Vec<String>) -> Result<Segment, RouteError> {
    let Some(open) = raw.find('{') else {
        if raw.contains('}') {
            return Err(RouteError::UnbalancedBrace(pattern.to_string()));
        }
        return Ok(Segment::Literal(raw.to_string()));
    };

    let prefix = &raw[..open];
    let rest = &raw[open + 1..];
    let close = rest
        .find('}')
        .ok_or_else(|| RouteError::UnbalancedBrace(pattern.to_string()))?;
    let name = &rest[..close];
    let suffix = &rest[close + 1..];

    if prefix.contains('}') || name.contains('{') {
        return Err(RouteError::UnbalancedBrace(pattern.to_string()));
    }
    if suffix.contains('{') {
        return Err(RouteError::MultipleParamsInSegment {
            pattern: pattern.to_string(),
            segment: raw.to_string(),
        });
    }
    if suffix.contains('}') {
        return Err(RouteError::UnbalancedBrace(pattern.to_string()));
    }
    if name.is_empty() {
        return Err(RouteError::EmptyParam(pattern.to_string()));
    }
    if names.iter().any(|n| n == name) {
        return Err(RouteError::DuplicateParam {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }

    names.push(name.to_string());
    Ok(Segment::Param {
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
    })
}

/// Decode a captured segment: `+` becomes a space, `%XX` escapes are
/// resolved, and invalid UTF-8 is replaced.
pub fn url_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(pattern: &str) -> RouteTemplate {
        RouteTemplate::compile("GET", pattern, false).unwrap()
    }

    #[test]
    fn test_literal_pattern() {
        let t = template("/api/media");
        assert_eq!(t.captures("/api/media"), Some(vec![]));
        assert_eq!(t.captures("/api/media/"), None);
        assert_eq!(t.captures("/api/Media"), None);
        assert_eq!(t.captures("/api"), None);
    }

    #[test]
    fn test_placeholder_captures_one_segment() {
        let t = template("/api/users/{username}/profile");
        assert_eq!(t.param_names(), ["username".to_string()]);
        assert_eq!(t.captures("/api/users/alice/profile"), Some(vec!["alice"]));
        assert_eq!(t.captures("/api/users/a/b/profile"), None);
        assert_eq!(t.captures("/api/users/alice/profile/extra"), None);
    }

    #[test]
    fn test_empty_capture_permitted() {
        let t = template("/api/media/{id}");
        assert_eq!(t.captures("/api/media/"), Some(vec![""]));
    }

    #[test]
    fn test_prefix_and_suffix_around_placeholder() {
        let t = template("/files/v{version}.json");
        assert_eq!(t.captures("/files/v12.json"), Some(vec!["12"]));
        assert_eq!(t.captures("/files/v.json"), Some(vec![""]));
        assert_eq!(t.captures("/files/12.json"), None);
        assert_eq!(t.captures("/files/v1.js"), None);
    }

    #[test]
    fn test_extract_url_decodes() {
        let t = template("/api/users/{username}");
        let params = t.extract("/api/users/john%20doe").unwrap();
        assert_eq!(params, vec![("username".to_string(), "john doe".to_string())]);

        let params = t.extract("/api/users/a+b%2Bc").unwrap();
        assert_eq!(params[0].1, "a b+c");
    }

    #[test]
    fn test_case_insensitive_literals() {
        let t = RouteTemplate::compile("get", "/API/Users/{name}", true).unwrap();
        assert_eq!(t.method(), "GET");
        assert_eq!(t.captures("/api/users/Bob"), Some(vec!["Bob"]));
    }

    #[test]
    fn test_method_matching() {
        let t = template("/");
        assert!(t.matches_method("get"));
        assert!(t.matches_method("GET"));
        assert!(!t.matches_method("POST"));
    }

    #[test]
    fn test_rejects_malformed_patterns() {
        assert_eq!(
            RouteTemplate::compile("GET", "api", false),
            Err(RouteError::MissingLeadingSlash("api".into()))
        );
        assert_eq!(
            RouteTemplate::compile("GET", "/a/{id", false),
            Err(RouteError::UnbalancedBrace("/a/{id".into()))
        );
        assert_eq!(
            RouteTemplate::compile("GET", "/a/id}", false),
            Err(RouteError::UnbalancedBrace("/a/id}".into()))
        );
        assert_eq!(
            RouteTemplate::compile("GET", "/a/{}", false),
            Err(RouteError::EmptyParam("/a/{}".into()))
        );
        assert!(matches!(
            RouteTemplate::compile("GET", "/a/{x}-{y}", false),
            Err(RouteError::MultipleParamsInSegment { .. })
        ));
        assert!(matches!(
            RouteTemplate::compile("GET", "/a/{id}/b/{id}", false),
            Err(RouteError::DuplicateParam { .. })
        ));
        assert!(matches!(
            RouteTemplate::compile("", "/", false),
            Err(RouteError::InvalidMethod(_))
        ));
    }
}
