use serde::Serialize;

use crate::sources::Metadata;

/// Column count reported in the shape of every file source.
const LISTING_COLUMNS: usize = 2;

/// A descriptive, non-authoritative summary of a source.
///
/// File sources never know their row count up front, so the first dimension
/// of `shape` is always unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub datashape: Option<String>,
    pub dtype: Option<String>,
    pub shape: [Option<usize>; 2],
    pub npartitions: usize,
    pub extra_metadata: Metadata,
}

impl Schema {
    pub fn for_partitions(npartitions: usize) -> Self {
        Self {
            datashape: None,
            dtype: None,
            shape: [None, Some(LISTING_COLUMNS)],
            npartitions,
            extra_metadata: Metadata::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_for_partitions() {
        let schema = Schema::for_partitions(3);
        assert_eq!(schema.shape, [None, Some(2)]);
        assert_eq!(schema.npartitions, 3);
        assert!(schema.dtype.is_none());
        assert!(schema.datashape.is_none());
        assert!(schema.extra_metadata.is_empty());
    }

    #[test]
    fn test_serializes_like_a_catalog_schema() {
        let value = serde_json::to_value(Schema::for_partitions(0)).unwrap();
        assert_eq!(
            value,
            json!({
                "datashape": null,
                "dtype": null,
                "shape": [null, 2],
                "npartitions": 0,
                "extra_metadata": {}
            })
        );
    }
}
