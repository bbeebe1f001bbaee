//! Decides which request paths need a bearer token.
//!
//! A [`RouteClassifier`] holds an ordered table of [`RouteRule`]s. The first rule whose pattern matches the request
//! path decides the outcome. When no rule matches, the path requires authentication.
//!
//! Patterns use ant-style globs:
//! * `*` matches any run of characters inside a single path segment,
//! * `**` matches zero or more whole segments,
//! * `?` matches exactly one character inside a segment.
//!
//! Everything else is matched literally, so `/auth/**` covers `/auth`, `/auth/login` and `/auth/a/b`, but not
//! `/authority`.
use std::fmt;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("'{pattern}' is not a valid route pattern. {reason}")]
pub struct RouteRuleError {
    pub pattern: String,
    pub reason: String,
}

impl RouteRuleError {
    fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self { pattern: pattern.to_string(), reason: reason.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Public => write!(f, "public"),
            Requirement::Authenticated => write!(f, "authenticated"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, RouteRuleError> {
        let pattern = pattern.trim();
        if !pattern.starts_with('/') {
            return Err(RouteRuleError::new(pattern, "Patterns must start with '/'"));
        }
        let mut re = String::from("^");
        let segments = pattern[1..].split('/').collect::<Vec<_>>();
        for segment in segments {
            if segment == "**" {
                re.push_str("(?:/.*)?");
                continue;
            }
            if segment.contains("**") {
                return Err(RouteRuleError::new(pattern, "'**' must be a whole path segment"));
            }
            re.push('/');
            for c in segment.chars() {
                match c {
                    '*' => re.push_str("[^/]*"),
                    '?' => re.push_str("[^/]"),
                    c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
                }
            }
        }
        re.push('$');
        let regex = Regex::new(&re).map_err(|e| RouteRuleError::new(pattern, e.to_string()))?;
        Ok(Self { source: pattern.to_string(), regex })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: PathPattern,
    requirement: Requirement,
}

impl RouteRule {
    pub fn new(pattern: &str, requirement: Requirement) -> Result<Self, RouteRuleError> {
        Ok(Self { pattern: PathPattern::new(pattern)?, requirement })
    }

    pub fn public(pattern: &str) -> Result<Self, RouteRuleError> {
        Self::new(pattern, Requirement::Public)
    }

    pub fn authenticated(pattern: &str) -> Result<Self, RouteRuleError> {
        Self::new(pattern, Requirement::Authenticated)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteClassifier {
    rules: Vec<RouteRule>,
}

impl RouteClassifier {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// A classifier where each of `patterns` is public and everything else requires authentication.
    pub fn with_public_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RouteRuleError> {
        let rules = patterns.iter().map(|p| RouteRule::public(p.as_ref())).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn classify(&self, path: &str) -> Requirement {
        if has_dot_segments(path) {
            return Requirement::Authenticated;
        }
        self.rules.iter().find(|r| r.pattern.matches(path)).map(|r| r.requirement).unwrap_or(Requirement::Authenticated)
    }

    pub fn patterns(&self) -> impl Iterator<Item = (&str, Requirement)> {
        self.rules.iter().map(|r| (r.pattern.as_str(), r.requirement))
    }
}

/// `.` and `..` segments (also percent-encoded) never match a public rule.
fn has_dot_segments(path: &str) -> bool {
    path.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    })
}
