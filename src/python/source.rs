use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::common::{PyPathAsPattern, PyUrlPath, criterion, from_python, to_python};
use crate::sources::{Criteria, DataSource, FileSource, Metadata, PathAsPattern};

#[pyclass(name = "FileSource", module = "pqtool")]
pub struct PyFileSource {
    inner: FileSource,
}

#[pymethods]
impl PyFileSource {
    #[new]
    #[pyo3(signature = (urlpath, metadata = None, path_as_pattern = None))]
    fn new(
        urlpath: PyUrlPath,
        metadata: Option<Bound<'_, PyAny>>,
        path_as_pattern: Option<PyPathAsPattern>,
    ) -> anyhow::Result<Self> {
        let metadata = metadata
            .filter(|m| !m.is_none())
            .map(|m| from_python::<Metadata>(&m))
            .transpose()?;
        let path_as_pattern = path_as_pattern
            .map(PathAsPattern::from)
            .unwrap_or_default();

        Ok(Self {
            inner: FileSource::new(urlpath, metadata, path_as_pattern)?,
        })
    }

    #[getter]
    fn files(&self) -> Vec<String> {
        self.inner.files().to_vec()
    }

    #[getter]
    fn urlpath(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, self.inner.urlpath())
    }

    #[getter]
    fn metadata(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, self.inner.metadata())
    }

    #[getter]
    fn name(&self) -> Option<String> {
        self.inner.name().map(str::to_string)
    }

    fn get_schema(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, &self.inner.get_schema())
    }

    fn discover(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, &self.inner.discover())
    }

    fn describe(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, &self.inner.describe())
    }

    /// Narrow the source by field: `subset(date=slice("2020-01-01", "2020-02-01"))`.
    #[pyo3(signature = (**criteria))]
    fn subset(&self, criteria: Option<&Bound<'_, PyDict>>) -> anyhow::Result<Self> {
        let mut parsed = Criteria::new();
        if let Some(criteria) = criteria {
            for (field, value) in criteria.iter() {
                parsed.insert(field.extract()?, criterion(&value)?);
            }
        }

        Ok(Self {
            inner: self.inner.subset(&parsed)?,
        })
    }

    fn __len__(&self) -> usize {
        self.inner.files().len()
    }

    fn __repr__(&self) -> String {
        format!(
            "FileSource(urlpath={}, files={})",
            self.inner.urlpath(),
            self.inner.files().len()
        )
    }
}
