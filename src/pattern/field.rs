//! Declared field types and the values decoded from paths.

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Array, Int64Array, Scalar, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::format::{Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::pattern::PatternError;

/// Date strings accepted for date criteria, most specific first.
const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y-%m",
    "%Y",
];

/// The type a pattern field declares through its format spec.
///
/// `{date:%Y-%m-%d}` is a date, `{run:03d}` an integer, `{ratio:.2f}` a float,
/// and a bare `{name}` a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "format", rename_all = "lowercase")]
pub enum FieldType {
    Str,
    Int,
    Float,
    DateTime(String),
}

impl FieldType {
    pub fn from_spec(spec: Option<&str>) -> Self {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return FieldType::Str;
        };

        if spec.contains('%') {
            return FieldType::DateTime(spec.to_string());
        }

        match spec.chars().last() {
            Some('d') => FieldType::Int,
            Some('f' | 'F' | 'e' | 'E' | 'g' | 'G') => FieldType::Float,
            _ => FieldType::Str,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            FieldType::Str => DataType::Utf8,
            FieldType::Int => DataType::Int64,
            FieldType::Float => DataType::Float64,
            FieldType::DateTime(_) => DataType::Timestamp(TimeUnit::Millisecond, None),
        }
    }

    /// Decode the text a path carried for this field.
    pub fn decode(&self, text: &str) -> Option<FieldValue> {
        match self {
            FieldType::Str => Some(FieldValue::Str(text.to_string())),
            FieldType::Int => text
                .trim_start_matches('+')
                .parse()
                .ok()
                .map(FieldValue::Int),
            FieldType::Float => text.parse().ok().map(FieldValue::Float),
            FieldType::DateTime(format) => parse_with_format(text, format).map(FieldValue::DateTime),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Str => write!(f, "str"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::DateTime(format) => write!(f, "datetime({format})"),
        }
    }
}

/// A single field value, either decoded from a path or supplied as a search value.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Str(String),
}

impl FieldValue {
    /// Convert this value to the declared type of `field`.
    ///
    /// Dates are truncated to millisecond precision.
    pub fn coerce(&self, field: &str, field_type: &FieldType) -> Result<FieldValue, PatternError> {
        let coerced = match (field_type, self) {
            (FieldType::Str, FieldValue::Str(s)) => Some(FieldValue::Str(s.clone())),
            (FieldType::Str, FieldValue::DateTime(dt)) => Some(FieldValue::Str(iso_text(dt))),
            (FieldType::Str, other) => Some(FieldValue::Str(other.to_string())),

            (FieldType::Int, FieldValue::Int(v)) => Some(FieldValue::Int(*v)),
            #[allow(clippy::cast_possible_truncation)]
            (FieldType::Int, FieldValue::Float(v)) if v.is_finite() && v.fract() == 0.0 => {
                Some(FieldValue::Int(*v as i64))
            }
            (FieldType::Int, FieldValue::Str(s)) => FieldType::Int.decode(s.trim()),

            (FieldType::Float, FieldValue::Float(v)) => Some(FieldValue::Float(*v)),
            #[allow(clippy::cast_precision_loss)]
            (FieldType::Float, FieldValue::Int(v)) => Some(FieldValue::Float(*v as f64)),
            (FieldType::Float, FieldValue::Str(s)) => FieldType::Float.decode(s.trim()),

            (FieldType::DateTime(_), FieldValue::DateTime(dt)) => {
                Some(FieldValue::DateTime(truncate_to_millis(*dt)))
            }
            (FieldType::DateTime(format), FieldValue::Str(s)) => {
                parse_datetime(s.trim(), format).map(FieldValue::DateTime)
            }

            _ => None,
        };

        coerced.ok_or_else(|| PatternError::Coerce {
            field: field.to_string(),
            value: self.to_string(),
            expected: field_type.clone(),
        })
    }

    /// A one-element array holding this value, for comparison kernels.
    pub fn to_scalar(&self) -> Scalar<ArrayRef> {
        let array: ArrayRef = match self {
            FieldValue::Str(s) => Arc::new(StringArray::from(vec![s.as_str()])),
            FieldValue::Int(v) => Arc::new(Int64Array::from(vec![*v])),
            FieldValue::Float(v) => Arc::new(Float64Array::from(vec![*v])),
            FieldValue::DateTime(dt) => Arc::new(TimestampMillisecondArray::from(vec![
                dt.and_utc().timestamp_millis(),
            ])),
        };
        Scalar::new(array)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "{s}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

/// ISO 8601 text for a date used against a string field; midnight is a bare date.
fn iso_text(dt: &NaiveDateTime) -> String {
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

pub(crate) fn truncate_to_millis(dt: NaiveDateTime) -> NaiveDateTime {
    let nanos = dt.nanosecond() / 1_000_000 * 1_000_000;
    dt.with_nanosecond(nanos).unwrap_or(dt)
}

/// Parse `text` with a strftime `format`, filling in the start of any period
/// the format leaves out (`%Y-%m` parses to the first of the month at midnight).
pub(crate) fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, text, StrftimeItems::new(format)).ok()?;

    // setters refuse to overwrite a value the text already supplied
    if parsed.to_naive_date().is_err() {
        let _ = parsed.set_month(1);
        let _ = parsed.set_day(1);
    }
    let date = parsed.to_naive_date().ok()?;

    if parsed.to_naive_time().is_err() {
        let _ = parsed.set_hour(0);
        let _ = parsed.set_minute(0);
    }
    let time = parsed.to_naive_time().ok()?;

    Some(truncate_to_millis(date.and_time(time)))
}

/// Parse a date criterion: the field's own format first, then ISO 8601 forms.
pub(crate) fn parse_datetime(text: &str, field_format: &str) -> Option<NaiveDateTime> {
    std::iter::once(field_format)
        .chain(ISO_DATETIME_FORMATS.iter().copied())
        .find_map(|format| parse_with_format(text, format))
}
