use thiserror::Error;

use crate::pattern::FieldType;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unclosed '{{' at byte {position} in pattern {template:?}")]
    UnclosedBrace { template: String, position: usize },

    #[error("unmatched '}}' at byte {position} in pattern {template:?}")]
    UnmatchedBrace { template: String, position: usize },

    #[error("empty field name at byte {position} in pattern {template:?}")]
    EmptyFieldName { template: String, position: usize },

    #[error("field {name:?} appears with conflicting formats in pattern {template:?}")]
    ConflictingField { template: String, name: String },

    #[error("pattern {template:?} could not be compiled into a matcher")]
    Matcher {
        template: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot interpret {value:?} as {expected} for field {field:?}")]
    Coerce {
        field: String,
        value: String,
        expected: FieldType,
    },
}
