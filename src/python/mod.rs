use pyo3::prelude::*;

mod common;
mod source;

pub fn register_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<source::PyFileSource>()?;
    Ok(())
}
