//! Python bindings
//!
//! Values cross the boundary as JSON strings using the same wire shape the
//! check-execution service reads.

use pyo3::prelude::*;

use crate::assertion::{self, Assertion, OpKind};
use crate::error::RuleError;
use crate::status_check::{self, MeasurementType, StatusCheckFilter};

fn decode<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, RuleError> {
    Ok(serde_json::from_str(json)?)
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, RuleError> {
    Ok(serde_json::to_string(value)?)
}

/// Serialize a JSON list of filters into a query string
#[pyfunction]
fn filters_to_query(filters_json: &str) -> PyResult<String> {
    let filters: Vec<StatusCheckFilter> = decode(filters_json)?;
    Ok(status_check::filters_to_query_string(&filters))
}

/// Parse a query string into a JSON list of filters
///
/// Malformed queries produce an empty list.
#[pyfunction]
fn query_to_filters(query: &str) -> PyResult<String> {
    Ok(encode(&status_check::query_to_filters(query))?)
}

/// Validate an assertion, returning one message per violation
#[pyfunction]
fn validate_assertion(assertion_json: &str) -> PyResult<Vec<String>> {
    let assertion = Assertion::from_json(assertion_json)?;
    Ok(assertion::validate(&assertion)
        .iter()
        .map(ToString::to_string)
        .collect())
}

/// Render an assertion as a compact one-line expression
#[pyfunction]
fn render_assertion(assertion_json: &str) -> PyResult<String> {
    Ok(Assertion::from_json(assertion_json)?.to_string())
}

/// JSON for the default op of the given kind, e.g. "status_code_check"
#[pyfunction]
fn default_op(kind: &str) -> PyResult<String> {
    let kind: OpKind = kind.parse()?;
    Ok(encode(&assertion::create_default(kind))?)
}

/// "%" for relative_diff, "MB" otherwise
#[pyfunction]
fn unit_for_measurement(measurement: &str) -> PyResult<&'static str> {
    let measurement: MeasurementType = measurement.parse()?;
    Ok(status_check::unit_for_measurement(measurement).as_str())
}

/// Python module definition
#[pymodule]
fn monitor_rules_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(filters_to_query, m)?)?;
    m.add_function(wrap_pyfunction!(query_to_filters, m)?)?;
    m.add_function(wrap_pyfunction!(validate_assertion, m)?)?;
    m.add_function(wrap_pyfunction!(render_assertion, m)?)?;
    m.add_function(wrap_pyfunction!(default_op, m)?)?;
    m.add_function(wrap_pyfunction!(unit_for_measurement, m)?)?;
    Ok(())
}
