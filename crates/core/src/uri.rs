//! Resource identifiers.
//!
//! Queries and change observers name their target with a hierarchical URI of
//! the form `scheme://authority/segment/segment`. Observers can ask to hear
//! about changes below their URI, so ancestry is part of the type.

use crate::error::{Error, Result};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// A parsed hierarchical resource identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceUri {
    scheme: String,
    authority: String,
    segments: Vec<String>,
}

impl ResourceUri {
    /// Parses `scheme://authority[/segment...]`.
    ///
    /// Empty segments (double or trailing slashes) are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| Error::invalid_uri(input, "missing '://'"))?;
        if scheme.is_empty() || !scheme.chars().all(is_scheme_char) {
            return Err(Error::invalid_uri(input, "invalid scheme"));
        }

        let mut parts = rest.split('/');
        let authority = parts.next().unwrap_or_default();
        if authority.is_empty() {
            return Err(Error::invalid_uri(input, "missing authority"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            authority: authority.to_string(),
            segments: parts
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// Builds a URI with no path from already valid parts.
    pub fn from_parts(scheme: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            segments: Vec::new(),
        }
    }

    /// Returns a new URI with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut uri = self.clone();
        uri.segments.push(segment.into());
        uri
    }

    /// Returns the scheme.
    #[inline]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the authority.
    #[inline]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the path segments.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true if `other` lies strictly below this URI.
    pub fn is_ancestor_of(&self, other: &ResourceUri) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && other.segments.len() > self.segments.len()
            && other.segments.starts_with(&self.segments)
    }
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

impl FromStr for ResourceUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
