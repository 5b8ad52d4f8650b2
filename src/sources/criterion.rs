use std::collections::BTreeMap;

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::kernels::cmp::{eq, gt_eq, lt};
use arrow::compute::{and, or};
use arrow::error::ArrowError;
use serde::{Deserialize, Serialize};

use crate::pattern::{FieldType, FieldValue, PatternError};

/// Search criteria keyed by pattern field name.
pub type Criteria = BTreeMap<String, Criterion>;

/// What a field's decoded value must satisfy for a file to be kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Equals(FieldValue),
    OneOf(Vec<FieldValue>),
    /// Half-open: `start <= value < stop`. A missing bound is unconstrained.
    Range {
        start: Option<FieldValue>,
        stop: Option<FieldValue>,
    },
}

impl Criterion {
    pub fn equals(value: impl Into<FieldValue>) -> Self {
        Criterion::Equals(value.into())
    }

    pub fn one_of<V: Into<FieldValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Criterion::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn range(start: impl Into<FieldValue>, stop: impl Into<FieldValue>) -> Self {
        Criterion::Range {
            start: Some(start.into()),
            stop: Some(stop.into()),
        }
    }

    pub fn from_start(start: impl Into<FieldValue>) -> Self {
        Criterion::Range {
            start: Some(start.into()),
            stop: None,
        }
    }

    pub fn until(stop: impl Into<FieldValue>) -> Self {
        Criterion::Range {
            start: None,
            stop: Some(stop.into()),
        }
    }

    /// Convert every value in the criterion to the field's declared type.
    pub fn coerce(&self, field: &str, field_type: &FieldType) -> Result<Criterion, PatternError> {
        let coerce = |v: &FieldValue| v.coerce(field, field_type);

        Ok(match self {
            Criterion::Equals(v) => Criterion::Equals(coerce(v)?),
            Criterion::OneOf(values) => {
                Criterion::OneOf(values.iter().map(coerce).collect::<Result<_, _>>()?)
            }
            Criterion::Range { start, stop } => Criterion::Range {
                start: start.as_ref().map(coerce).transpose()?,
                stop: stop.as_ref().map(coerce).transpose()?,
            },
        })
    }

    /// Evaluate the criterion against one field's per-file values.
    ///
    /// Values must already share the array's type (see [`Criterion::coerce`]).
    /// Null slots come back null and are treated as non-matching by callers.
    pub fn mask(&self, values: &ArrayRef) -> Result<BooleanArray, ArrowError> {
        match self {
            Criterion::Equals(v) => eq(values, &v.to_scalar()),
            Criterion::OneOf(candidates) => {
                let mut submatch = BooleanArray::from(vec![false; values.len()]);
                for candidate in candidates {
                    submatch = or(&submatch, &eq(values, &candidate.to_scalar())?)?;
                }
                Ok(submatch)
            }
            Criterion::Range { start, stop } => {
                let mut matched = BooleanArray::from(vec![true; values.len()]);
                if let Some(start) = start {
                    matched = and(&matched, &gt_eq(values, &start.to_scalar())?)?;
                }
                if let Some(stop) = stop {
                    matched = and(&matched, &lt(values, &stop.to_scalar())?)?;
                }
                Ok(matched)
            }
        }
    }
}

/// Parse a `FIELD=EXPR` search term.
///
/// `EXPR` is `start..stop` (either bound may be omitted) for a range, a
/// comma-separated list for a set of accepted values, or a single value.
pub fn parse_field_criterion(s: &str) -> Result<(String, Criterion), String> {
    let (field, expr) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid criterion '{s}': expected FIELD=EXPR"))?;

    let field = field.trim();
    if field.is_empty() {
        return Err(format!("invalid criterion '{s}': field name is empty"));
    }

    let expr = expr.trim();
    let bound = |b: &str| {
        let b = b.trim();
        (!b.is_empty()).then(|| FieldValue::from(b))
    };

    let criterion = if let Some((start, stop)) = expr.split_once("..") {
        Criterion::Range {
            start: bound(start),
            stop: bound(stop),
        }
    } else if expr.contains(',') {
        Criterion::OneOf(
            expr.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(FieldValue::from)
                .collect(),
        )
    } else {
        Criterion::Equals(FieldValue::from(expr))
    };

    Ok((field.to_string(), criterion))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};

    use super::*;

    fn ints(values: &[Option<i64>]) -> ArrayRef {
        Arc::new(Int64Array::from(values.to_vec()))
    }

    fn mask_values(mask: &BooleanArray) -> Vec<Option<bool>> {
        mask.iter().collect()
    }

    #[test]
    fn test_equals_mask() {
        let values: ArrayRef = Arc::new(StringArray::from(vec!["a", "b", "a"]));
        let mask = Criterion::equals("a").mask(&values).unwrap();
        assert_eq!(mask_values(&mask), vec![Some(true), Some(false), Some(true)]);
    }

    #[test]
    fn test_one_of_mask() {
        let values = ints(&[Some(1), Some(2), Some(3), Some(4)]);
        let mask = Criterion::one_of([2i64, 4]).mask(&values).unwrap();
        assert_eq!(
            mask_values(&mask),
            vec![Some(false), Some(true), Some(false), Some(true)]
        );
    }

    #[test]
    fn test_empty_one_of_matches_nothing() {
        let values = ints(&[Some(1), Some(2)]);
        let mask = Criterion::OneOf(vec![]).mask(&values).unwrap();
        assert_eq!(mask_values(&mask), vec![Some(false), Some(false)]);
    }

    #[test]
    fn test_range_is_half_open() {
        let values = ints(&[Some(1), Some(2), Some(3), Some(4)]);

        let mask = Criterion::range(2i64, 4i64).mask(&values).unwrap();
        assert_eq!(
            mask_values(&mask),
            vec![Some(false), Some(true), Some(true), Some(false)]
        );

        let mask = Criterion::from_start(3i64).mask(&values).unwrap();
        assert_eq!(
            mask_values(&mask),
            vec![Some(false), Some(false), Some(true), Some(true)]
        );

        let mask = Criterion::until(2i64).mask(&values).unwrap();
        assert_eq!(
            mask_values(&mask),
            vec![Some(true), Some(false), Some(false), Some(false)]
        );

        let unbounded = Criterion::Range {
            start: None,
            stop: None,
        };
        assert_eq!(unbounded.mask(&values).unwrap().true_count(), 4);
    }

    #[test]
    fn test_null_values_never_match() {
        let values = ints(&[None, Some(2)]);
        let mask = Criterion::equals(2i64).mask(&values).unwrap();
        assert_eq!(mask.true_count(), 1);
        assert!(!mask.is_valid(0) || !mask.value(0));
    }

    #[test]
    fn test_coerce_applies_to_every_value() {
        let criterion = Criterion::Range {
            start: Some(FieldValue::from("1")),
            stop: None,
        };
        assert_eq!(
            criterion.coerce("n", &FieldType::Int).unwrap(),
            Criterion::from_start(1i64)
        );

        let list = Criterion::one_of(["1", "x"]);
        assert!(list.coerce("n", &FieldType::Int).is_err());
    }

    #[test]
    fn test_parse_field_criterion() {
        assert_eq!(
            parse_field_criterion("region=us").unwrap(),
            ("region".to_string(), Criterion::equals("us"))
        );
        assert_eq!(
            parse_field_criterion("region=us, eu").unwrap(),
            ("region".to_string(), Criterion::one_of(["us", "eu"]))
        );
        assert_eq!(
            parse_field_criterion("date=2020-01-01..2020-02-01").unwrap(),
            (
                "date".to_string(),
                Criterion::range("2020-01-01", "2020-02-01")
            )
        );
        assert_eq!(
            parse_field_criterion("date=..2020-02-01").unwrap().1,
            Criterion::Range {
                start: None,
                stop: Some(FieldValue::from("2020-02-01"))
            }
        );
        assert_eq!(
            parse_field_criterion("ratio=0.5..").unwrap().1,
            Criterion::from_start("0.5")
        );
    }

    #[test]
    fn test_parse_field_criterion_errors() {
        assert!(parse_field_criterion("region").is_err());
        assert!(parse_field_criterion("=us").is_err());
    }
}
