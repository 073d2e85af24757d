use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

const DEFAULT_DOMAIN: &str = "docker.io";
const LEGACY_DEFAULT_DOMAIN: &str = "index.docker.io";
const OFFICIAL_REPO_PREFIX: &str = "library/";
const DEFAULT_TAG: &str = "latest";

/// Normalized container image reference (`domain/path[:tag][@digest]`).
///
/// Parsing fills in the defaults a container runtime would apply:
/// - no domain → `docker.io`;
/// - single-component path on `docker.io` → `library/<path>`;
/// - neither tag nor digest → tag `latest`.
///
/// Two references are equal iff their normalized forms are equal, so
/// `redis` and `docker.io/library/redis:latest` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef {
    domain: String,
    path: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    /// Parse and normalize a reference.
    pub fn parse(s: &str) -> ModelResult<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(invalid(s, "empty reference"));
        }

        let (name_tag, digest) = match raw.split_once('@') {
            Some((n, d)) => {
                let (algo, hex) = d
                    .split_once(':')
                    .ok_or_else(|| invalid(s, "digest must be <algorithm>:<hex>"))?;
                if algo.is_empty() || hex.is_empty() {
                    return Err(invalid(s, "digest must be <algorithm>:<hex>"));
                }
                (n, Some(d.to_string()))
            }
            None => (raw, None),
        };

        // A ':' after the last '/' separates the tag; earlier ones belong to a registry port.
        let last_slash = name_tag.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (name, tag) = match name_tag[last_slash..].rfind(':') {
            Some(i) => {
                let at = last_slash + i;
                (&name_tag[..at], Some(&name_tag[at + 1..]))
            }
            None => (name_tag, None),
        };

        if let Some(tag) = tag {
            validate_tag(s, tag)?;
        }

        let (domain, path) = split_domain(name);
        validate_path(s, path)?;

        let domain = match domain {
            None | Some(LEGACY_DEFAULT_DOMAIN) => DEFAULT_DOMAIN.to_string(),
            Some(d) => d.to_string(),
        };
        let path = if domain == DEFAULT_DOMAIN && !path.contains('/') {
            format!("{OFFICIAL_REPO_PREFIX}{path}")
        } else {
            path.to_string()
        };
        let tag = match (tag, &digest) {
            (Some(t), _) => Some(t.to_string()),
            (None, None) => Some(DEFAULT_TAG.to_string()),
            (None, Some(_)) => None,
        };

        Ok(Self {
            domain,
            path,
            tag,
            digest,
        })
    }

    /// Registry domain, e.g. `docker.io` or `localhost:5000`.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Repository path inside the registry, e.g. `library/redis`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fully-qualified repository name without tag or digest.
    pub fn name(&self) -> String {
        format!("{}/{}", self.domain, self.path)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

fn invalid(reference: &str, reason: &str) -> ModelError {
    ModelError::InvalidImageRef {
        reference: reference.to_string(),
        reason: reason.to_string(),
    }
}

/// Split off the registry domain, if the first component looks like one.
fn split_domain(name: &str) -> (Option<&str>, &str) {
    match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (Some(first), rest)
        }
        _ => (None, name),
    }
}

fn validate_path(reference: &str, path: &str) -> ModelResult<()> {
    if path.is_empty() {
        return Err(invalid(reference, "empty repository name"));
    }
    for component in path.split('/') {
        if component.is_empty() {
            return Err(invalid(reference, "empty path component"));
        }
        if !component
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        {
            return Err(invalid(
                reference,
                "repository name must be lowercase alphanumerics and separators",
            ));
        }
    }
    Ok(())
}

fn validate_tag(reference: &str, tag: &str) -> ModelResult<()> {
    let mut chars = tag.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    if !first_ok || tag.len() > 128 {
        return Err(invalid(reference, "invalid tag"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(invalid(reference, "invalid tag"));
    }
    Ok(())
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.path)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl FromStr for ImageRef {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ModelError;
    fn try_from(s: String) -> ModelResult<Self> {
        Self::parse(&s)
    }
}

impl From<ImageRef> for String {
    fn from(r: ImageRef) -> Self {
        r.to_string()
    }
}
