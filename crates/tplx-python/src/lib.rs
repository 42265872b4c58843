use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use tplx_core::{apply, Block, ErrorEnvelope, Template};

fn envelope_error(err: &tplx_core::Error) -> PyErr {
    let envelope: ErrorEnvelope = err.into();
    let body = serde_json::to_string(&envelope).unwrap_or_else(|_| err.to_string());
    PyValueError::new_err(body)
}

fn parse_json_err(context: &str, err: serde_json::Error) -> PyErr {
    PyValueError::new_err(format!("invalid {context} JSON: {err}"))
}

/// Apply `template_json` to `blocks_json` and return the `{values,
/// missing_required, debug?}` envelope as a JSON string.
#[pyfunction]
fn apply_template(template_json: &str, blocks_json: &str, include_debug: bool) -> PyResult<String> {
    let template: Template = serde_json::from_str(template_json).map_err(|e| parse_json_err("template", e))?;
    let blocks: Vec<Block> = serde_json::from_str(blocks_json).map_err(|e| parse_json_err("blocks", e))?;

    let result = apply(&template, &blocks, include_debug).map_err(|e| envelope_error(&e))?;
    serde_json::to_string(&result).map_err(|e| parse_json_err("result", e))
}

/// Validate `template_json`'s shape (§4.8) without applying it to any blocks.
/// Returns `"{}"` on success; raises with the error envelope on failure.
#[pyfunction]
fn validate_template(template_json: &str) -> PyResult<String> {
    let template: Template = serde_json::from_str(template_json).map_err(|e| parse_json_err("template", e))?;
    tplx_core::template::validate(&template).map_err(|e| envelope_error(&e))?;
    Ok("{}".to_string())
}

#[pymodule]
fn _tplx(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apply_template, m)?)?;
    m.add_function(wrap_pyfunction!(validate_template, m)?)?;
    m.add("__version__", "0.1.0")?;
    Ok(())
}
