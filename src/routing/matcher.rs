//! Path matching logic.
//!
//! # Responsibilities
//! - Match view path patterns (`/strategy/:id`) and capture parameters
//! - Match proxy path prefixes
//!
//! # Design Decisions
//! - Literal segments match case-insensitively, like the console router
//! - A single trailing slash is tolerated (`/m/` matches `/m`); empty
//!   interior segments (`/m//record`) never match
//! - Parameters capture one non-empty segment, passed through untouched
//! - Prefix matching is case-sensitive and purely textual
//! - No regex to guarantee O(n) matching

/// Captured path parameters, in pattern order.
pub type Params = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route pattern such as `/m/strategy/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: &'static str,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &'static str) -> Self {
        let segments = split(pattern)
            .unwrap_or_default()
            .into_iter()
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_ascii_lowercase()),
            })
            .collect();
        Self {
            raw: pattern,
            segments,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    /// Match a request path (no query string), returning captured params.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts = split(path)?;
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) => {
                    if !lit.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => params.push((name.clone(), part.to_string())),
            }
        }
        Some(params)
    }
}

/// Segments of a path, tolerating one trailing slash. `None` when any
/// interior segment is empty (`/m//record`, `//pc`).
fn split(path: &str) -> Option<Vec<&str>> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Some(Vec::new());
    }
    let path = path.strip_suffix('/').unwrap_or(path);
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern() {
        let pattern = PathPattern::new("/m/record");
        assert_eq!(pattern.matches("/m/record"), Some(vec![]));
        assert_eq!(pattern.matches("/M/Record/"), Some(vec![])); // Case insensitive
        assert_eq!(pattern.matches("/m"), None);
        assert_eq!(pattern.matches("/m/record/extra"), None);
    }

    #[test]
    fn test_param_capture() {
        let pattern = PathPattern::new("/strategy/:id");
        assert_eq!(
            pattern.matches("/strategy/42"),
            Some(vec![("id".to_string(), "42".to_string())])
        );
        // Opaque: no validation of the captured value
        assert_eq!(
            pattern.matches("/strategy/not-a-number"),
            Some(vec![("id".to_string(), "not-a-number".to_string())])
        );
        assert_eq!(pattern.matches("/strategy"), None);
        assert_eq!(pattern.matches("/strategy//"), None);
    }

    #[test]
    fn test_empty_interior_segments_rejected() {
        assert_eq!(PathPattern::new("/m/record").matches("/m//record"), None);
        assert_eq!(PathPattern::new("/pc").matches("//pc"), None);
        assert_eq!(PathPattern::new("/m").matches("/m//"), None);
        assert_eq!(PathPattern::new("/").matches("//"), None);
        assert_eq!(PathPattern::new("/m").matches("/m/"), Some(vec![]));
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::new("/");
        assert_eq!(pattern.matches("/"), Some(vec![]));
        assert_eq!(pattern.matches(""), Some(vec![]));
        assert_eq!(pattern.matches("/pc"), None);
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(matcher.matches("/api/strategies"));
        assert!(matcher.matches("/api"));
        assert!(!matcher.matches("/images"));
        assert!(!matcher.matches("/API/strategies"));
    }
}
