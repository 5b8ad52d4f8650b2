use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pattern::PathPattern;
use crate::sources::{Metadata, PathAsPattern, Schema, UrlPath};

/// The lifecycle every catalog source provides.
pub trait DataSource {
    /// Short name of the driver implementing the source.
    fn driver(&self) -> &str;

    fn name(&self) -> Option<&str>;

    fn metadata(&self) -> &Metadata;

    fn get_schema(&self) -> Schema;

    fn describe(&self) -> SourceDescription;

    fn discover(&self) -> Schema {
        let schema = self.get_schema();
        debug!(
            driver = self.driver(),
            name = self.name().unwrap_or_default(),
            npartitions = schema.npartitions,
            "discovered source"
        );
        schema
    }
}

/// Sources whose urlpath can double as a field template.
pub trait PatternSource: DataSource {
    fn path_as_pattern(&self) -> &PathAsPattern;

    /// The template fields are decoded with, if any.
    fn pattern(&self) -> Option<&PathPattern>;

    /// The urlpath as first supplied, kept across derived sources.
    fn original_urlpath(&self) -> &UrlPath;
}

/// Constructor arguments of a file source, as stored in a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverArgs {
    pub urlpath: UrlPath,
    #[serde(default)]
    pub path_as_pattern: PathAsPattern,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDescription {
    pub name: Option<String>,
    pub driver: String,
    pub description: Option<String>,
    pub args: DriverArgs,
    pub metadata: Metadata,
}
