use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Where a source's files come from: one glob/template, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlPath {
    Pattern(String),
    Paths(Vec<String>),
}

impl UrlPath {
    /// Join relative entries onto `base`; absolute entries are left alone.
    pub fn resolve_against(&self, base: &Path) -> UrlPath {
        match self {
            UrlPath::Pattern(p) => UrlPath::Pattern(resolve_path(p, base)),
            UrlPath::Paths(paths) => {
                UrlPath::Paths(paths.iter().map(|p| resolve_path(p, base)).collect())
            }
        }
    }
}

impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPath::Pattern(p) => write!(f, "{p}"),
            UrlPath::Paths(paths) => write!(f, "[{}]", paths.join(", ")),
        }
    }
}

impl From<&str> for UrlPath {
    fn from(value: &str) -> Self {
        UrlPath::Pattern(value.to_string())
    }
}

impl From<String> for UrlPath {
    fn from(value: String) -> Self {
        UrlPath::Pattern(value)
    }
}

impl From<Vec<String>> for UrlPath {
    fn from(value: Vec<String>) -> Self {
        UrlPath::Paths(value)
    }
}

impl From<Vec<&str>> for UrlPath {
    fn from(value: Vec<&str>) -> Self {
        UrlPath::Paths(value.into_iter().map(str::to_string).collect())
    }
}

/// Whether, and how, the urlpath doubles as a field template.
///
/// `Flag(true)` uses the urlpath itself as the template, `Flag(false)` turns
/// field decoding off, and `Template` names a separate template while the
/// urlpath is globbed as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathAsPattern {
    Flag(bool),
    Template(String),
}

impl PathAsPattern {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, PathAsPattern::Flag(false))
    }

    pub fn resolve_against(&self, base: &Path) -> PathAsPattern {
        match self {
            PathAsPattern::Template(t) => PathAsPattern::Template(resolve_path(t, base)),
            flag => flag.clone(),
        }
    }
}

impl Default for PathAsPattern {
    fn default() -> Self {
        PathAsPattern::Flag(true)
    }
}

impl From<bool> for PathAsPattern {
    fn from(value: bool) -> Self {
        PathAsPattern::Flag(value)
    }
}

impl From<&str> for PathAsPattern {
    fn from(value: &str) -> Self {
        PathAsPattern::Template(value.to_string())
    }
}

impl From<String> for PathAsPattern {
    fn from(value: String) -> Self {
        PathAsPattern::Template(value)
    }
}

fn resolve_path(path: &str, base: &Path) -> String {
    if Path::new(path).is_absolute() {
        path.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
