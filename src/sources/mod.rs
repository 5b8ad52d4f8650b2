pub mod criterion;
pub mod data_source;
pub mod file_source;
pub mod schema;
pub mod urlpath;

pub use criterion::{Criteria, Criterion, parse_field_criterion};
pub use data_source::{DataSource, DriverArgs, PatternSource, SourceDescription};
pub use file_source::FileSource;
pub use schema::Schema;
pub use urlpath::{PathAsPattern, UrlPath};

/// Free-form annotations attached to a source.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
