use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Builder, Int64Builder, StringBuilder, TimestampMillisecondBuilder,
};
use tracing::debug;

use crate::pattern::{FieldType, FieldValue, PathPattern};

/// Values of one pattern field across a file list, aligned by index.
#[derive(Debug, Clone)]
pub struct DecodedField {
    pub name: String,
    pub field_type: FieldType,
    pub values: ArrayRef,
}

/// Every field decoded from a file list; each array has one slot per file.
#[derive(Debug, Clone, Default)]
pub struct DecodedFields {
    fields: Vec<DecodedField>,
    len: usize,
}

impl DecodedFields {
    /// No fields for `len` files.
    pub fn empty(len: usize) -> Self {
        Self {
            fields: Vec::new(),
            len,
        }
    }

    pub fn get(&self, name: &str) -> Option<&DecodedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecodedField> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Number of files the arrays cover.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }
}

/// Turns a file list into per-field value arrays.
pub trait FieldDecoder {
    fn reverse_formats(&self, paths: &[String]) -> DecodedFields;
}

impl FieldDecoder for PathPattern {
    fn reverse_formats(&self, paths: &[String]) -> DecodedFields {
        let mut builders: Vec<FieldBuilder> = self
            .fields()
            .iter()
            .map(|f| FieldBuilder::new(&f.field_type, paths.len()))
            .collect();

        let mut unmatched = 0usize;
        for path in paths {
            let decoded = self.reverse_format(path);
            if decoded.is_none() {
                unmatched += 1;
            }
            for (field, builder) in self.fields().iter().zip(builders.iter_mut()) {
                builder.append(decoded.as_ref().and_then(|values| values.get(&field.name)));
            }
        }

        if unmatched > 0 {
            debug!(
                pattern = %self,
                unmatched,
                total = paths.len(),
                "some paths do not fit the pattern; their fields are null"
            );
        }

        let fields = self
            .fields()
            .iter()
            .zip(builders)
            .map(|(field, builder)| DecodedField {
                name: field.name.clone(),
                field_type: field.field_type.clone(),
                values: builder.finish(),
            })
            .collect();

        DecodedFields {
            fields,
            len: paths.len(),
        }
    }
}

enum FieldBuilder {
    Str(StringBuilder),
    Int(Int64Builder),
    Float(Float64Builder),
    DateTime(TimestampMillisecondBuilder),
}

impl FieldBuilder {
    fn new(field_type: &FieldType, capacity: usize) -> Self {
        match field_type {
            FieldType::Str => FieldBuilder::Str(StringBuilder::with_capacity(capacity, capacity * 8)),
            FieldType::Int => FieldBuilder::Int(Int64Builder::with_capacity(capacity)),
            FieldType::Float => FieldBuilder::Float(Float64Builder::with_capacity(capacity)),
            FieldType::DateTime(_) => {
                FieldBuilder::DateTime(TimestampMillisecondBuilder::with_capacity(capacity))
            }
        }
    }

    fn append(&mut self, value: Option<&FieldValue>) {
        match (self, value) {
            (FieldBuilder::Str(b), Some(FieldValue::Str(v))) => b.append_value(v),
            (FieldBuilder::Int(b), Some(FieldValue::Int(v))) => b.append_value(*v),
            (FieldBuilder::Float(b), Some(FieldValue::Float(v))) => b.append_value(*v),
            (FieldBuilder::DateTime(b), Some(FieldValue::DateTime(v))) => {
                b.append_value(v.and_utc().timestamp_millis())
            }
            (FieldBuilder::Str(b), _) => b.append_null(),
            (FieldBuilder::Int(b), _) => b.append_null(),
            (FieldBuilder::Float(b), _) => b.append_null(),
            (FieldBuilder::DateTime(b), _) => b.append_null(),
        }
    }

    fn finish(self) -> ArrayRef {
        match self {
            FieldBuilder::Str(mut b) => Arc::new(b.finish()),
            FieldBuilder::Int(mut b) => Arc::new(b.finish()),
            FieldBuilder::Float(mut b) => Arc::new(b.finish()),
            FieldBuilder::DateTime(mut b) => Arc::new(b.finish()),
        }
    }
}
