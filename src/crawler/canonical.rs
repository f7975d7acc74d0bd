//! URL canonicalization
//!
//! A canonical URL is the identity key of a page inside one traversal. It
//! keeps the scheme (defaulting to `http`), the host exactly as written, the
//! path without one trailing slash, and the query string. The fragment is
//! dropped. Canonicalization never fails: input that cannot be split into
//! scheme and authority falls back to the raw string minus its fragment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized identity of a URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// The canonical form as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&url::Url> for CanonicalUrl {
    fn from(url: &url::Url) -> Self {
        canonicalize(url.as_str())
    }
}

/// Canonicalize a URL string
pub fn canonicalize(url: &str) -> CanonicalUrl {
    let raw = url.trim();
    let without_fragment = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };

    match split_url(without_fragment) {
        Some(parts) => {
            let path = parts.path.strip_suffix('/').unwrap_or(parts.path);
            let mut canonical = format!("{}://{}{}", parts.scheme, parts.authority, path);
            if let Some(query) = parts.query.filter(|q| !q.is_empty()) {
                canonical.push('?');
                canonical.push_str(query);
            }
            CanonicalUrl(canonical)
        }
        None => CanonicalUrl(without_fragment.to_string()),
    }
}

struct UrlParts<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
    query: Option<&'a str>,
}

fn split_url(input: &str) -> Option<UrlParts<'_>> {
    let (scheme, rest) = match input.find("://") {
        Some(pos) => {
            let scheme = &input[..pos];
            if !is_valid_scheme(scheme) {
                return None;
            }
            (scheme, &input[pos + 3..])
        }
        None => match input.strip_prefix("//") {
            Some(rest) => ("http", rest),
            None => ("http", input),
        },
    };

    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    if authority.is_empty() || authority.chars().any(char::is_whitespace) {
        return None;
    }

    let remainder = &rest[authority_end..];
    let (path, query) = match remainder.find('?') {
        Some(pos) => (&remainder[..pos], Some(&remainder[pos + 1..])),
        None => (remainder, None),
    };

    Some(UrlParts {
        scheme,
        authority,
        path,
        query,
    })
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
