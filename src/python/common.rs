use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyList, PySet, PySlice, PyTuple};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::pattern::FieldValue;
use crate::sources::{Criterion, PathAsPattern, UrlPath};

#[derive(FromPyObject)]
pub enum PyUrlPath {
    #[pyo3(transparent)]
    Single(String),
    #[pyo3(transparent)]
    Many(Vec<String>),
}

impl From<PyUrlPath> for UrlPath {
    fn from(urlpath: PyUrlPath) -> Self {
        match urlpath {
            PyUrlPath::Single(pattern) => UrlPath::Pattern(pattern),
            PyUrlPath::Many(paths) => UrlPath::Paths(paths),
        }
    }
}

#[derive(FromPyObject)]
pub enum PyPathAsPattern {
    #[pyo3(transparent)]
    Flag(bool),
    #[pyo3(transparent)]
    Template(String),
}

impl From<PyPathAsPattern> for PathAsPattern {
    fn from(value: PyPathAsPattern) -> Self {
        match value {
            PyPathAsPattern::Flag(flag) => PathAsPattern::Flag(flag),
            PyPathAsPattern::Template(template) => PathAsPattern::Template(template),
        }
    }
}

/// Hand a serializable value to Python as plain dicts, lists and scalars.
pub fn to_python<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let text = serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(py.import("json")?.call_method1("loads", (text,))?.unbind())
}

/// Read a JSON-compatible Python value.
pub fn from_python<T: DeserializeOwned>(obj: &Bound<'_, PyAny>) -> PyResult<T> {
    let text: String = obj
        .py()
        .import("json")?
        .call_method1("dumps", (obj,))?
        .extract()?;
    serde_json::from_str(&text).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Dates and datetimes arrive as their ISO text and are parsed per field.
fn field_value(obj: &Bound<'_, PyAny>) -> PyResult<FieldValue> {
    if obj.hasattr("isoformat")? {
        let iso: String = obj.call_method0("isoformat")?.extract()?;
        return Ok(FieldValue::Str(iso));
    }
    if let Ok(s) = obj.extract::<String>() {
        return Ok(FieldValue::Str(s));
    }
    if let Ok(i) = obj.extract::<i64>() {
        return Ok(FieldValue::Int(i));
    }
    if let Ok(f) = obj.extract::<f64>() {
        return Ok(FieldValue::Float(f));
    }
    Err(PyValueError::new_err(format!(
        "unsupported criterion value: {}",
        obj.repr()?
    )))
}

fn bound(obj: Bound<'_, PyAny>) -> PyResult<Option<FieldValue>> {
    if obj.is_none() {
        Ok(None)
    } else {
        field_value(&obj).map(Some)
    }
}

/// A scalar, a list/tuple/set of scalars, or a `slice(start, stop)`.
pub fn criterion(obj: &Bound<'_, PyAny>) -> PyResult<Criterion> {
    if let Ok(slice) = obj.downcast::<PySlice>() {
        if !slice.getattr("step")?.is_none() {
            return Err(PyValueError::new_err("slice criteria do not support a step"));
        }
        return Ok(Criterion::Range {
            start: bound(slice.getattr("start")?)?,
            stop: bound(slice.getattr("stop")?)?,
        });
    }

    let is_collection = obj.is_instance_of::<PyList>()
        || obj.is_instance_of::<PyTuple>()
        || obj.is_instance_of::<PySet>();
    if is_collection {
        let values = obj
            .try_iter()?
            .map(|item| field_value(&item?))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(Criterion::OneOf(values));
    }

    Ok(Criterion::Equals(field_value(obj)?))
}
