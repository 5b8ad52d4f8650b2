//! Path templates: parsing, glob conversion and reverse formatting.

mod error;
mod field;
mod reverse;
mod template;

pub use error::PatternError;
pub use field::{FieldType, FieldValue};
pub use reverse::{DecodedField, DecodedFields, FieldDecoder};
pub use template::{PathPattern, PatternField, Segment};
