//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Split a template into literal and `{name}` placeholder segments
//! - Reject malformed placeholders at registration time
//! - Match request paths segment-exactly, capturing placeholder values
//!
//! A placeholder matches exactly one path segment (no embedded `/`).
//! Matching is case-sensitive and requires the full path: no prefix or
//! partial matches.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile `template` into matchable segments.
    pub fn compile(template: &str) -> Result<Self, Error> {
        if !template.starts_with('/') {
            return Err(Error::Route(format!(
                "template `{template}` must start with `/`"
            )));
        }

        let mut segments = Vec::new();
        for part in template.split('/').skip(1) {
            if part.starts_with('{') || part.ends_with('}') {
                let name = part
                    .strip_prefix('{')
                    .and_then(|p| p.strip_suffix('}'))
                    .filter(|n| !n.is_empty() && !n.contains(['{', '}']))
                    .ok_or_else(|| {
                        Error::Route(format!(
                            "template `{template}` has a malformed placeholder `{part}`"
                        ))
                    })?;
                segments.push(Segment::Param(name.to_string()));
            } else if part.contains(['{', '}']) {
                return Err(Error::Route(format!(
                    "template `{template}` has a malformed placeholder `{part}`"
                )));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// The template string as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Match `path` against this template.
    ///
    /// Returns the placeholder captures on a full match, `None` otherwise.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        if !path.starts_with('/') {
            return None;
        }
        let parts: Vec<&str> = path.split('/').skip(1).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    captures.push((name.clone(), part.to_string()));
                }
            }
        }
        Some(captures)
    }
}
