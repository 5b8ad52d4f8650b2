//! JSON catalogs of named file sources.
//!
//! ```json
//! {
//!   "metadata": { "team": "ingest" },
//!   "sources": {
//!     "daily": {
//!       "description": "Daily exports",
//!       "args": { "urlpath": "exports/{date:%Y-%m-%d}.csv" },
//!       "metadata": { "format": "csv" }
//!     }
//!   }
//! }
//! ```
//!
//! Relative urlpaths resolve against the directory holding the catalog file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sources::{DriverArgs, FileSource, Metadata};

fn default_driver() -> String {
    FileSource::DRIVER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_driver")]
    pub driver: String,
    pub args: DriverArgs,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    sources: BTreeMap<String, CatalogEntry>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Catalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let mut catalog = Self::from_json(&text)
            .with_context(|| format!("Invalid catalog {}", path.display()))?;

        catalog.base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);

        debug!(path = %path.display(), entries = catalog.sources.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Parse a catalog; relative urlpaths stay relative to the working directory.
    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;

        for (name, entry) in &catalog.sources {
            if entry.driver != FileSource::DRIVER {
                bail!(
                    "Source '{}' uses unsupported driver '{}' (expected '{}')",
                    name,
                    entry.driver,
                    FileSource::DRIVER
                );
            }
        }

        Ok(catalog)
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.sources.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.sources.get(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Build the named source. Catalog-wide metadata is merged underneath the
    /// entry's own.
    pub fn source(&self, name: &str) -> Result<FileSource> {
        let entry = self.entry(name).ok_or_else(|| {
            let known: Vec<&str> = self.names().collect();
            anyhow!(
                "No source named '{}' in catalog (available: {})",
                name,
                known.join(", ")
            )
        })?;

        let (urlpath, path_as_pattern) = match &self.base_dir {
            Some(base) => (
                entry.args.urlpath.resolve_against(base),
                entry.args.path_as_pattern.resolve_against(base),
            ),
            None => (
                entry.args.urlpath.clone(),
                entry.args.path_as_pattern.clone(),
            ),
        };

        let mut metadata = self.metadata.clone();
        metadata.extend(entry.metadata.clone());

        let source = FileSource::new(urlpath, Some(metadata), path_as_pattern)
            .with_context(|| format!("Failed to open source '{name}'"))?
            .with_name(name);

        Ok(match &entry.description {
            Some(description) => source.with_description(description.clone()),
            None => source,
        })
    }
}
