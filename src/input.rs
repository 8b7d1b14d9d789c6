//! Reduction inputs from JSON and results back to JSON
//!
//! A payload document looks like
//!
//! ```json
//! {"group_idx": [0, 0, 1], "values": [1.0, null, 3.0], "shape": [3], "dtype": "float64"}
//! ```
//!
//! `shape` defaults to a 1-D array of all values, `dtype` to `int64` when every
//! value is an integer and `float64` otherwise. `null` and the string `"nan"`
//! both read as NaN.

use crate::array::{DType, GroupIndex, NumArray, Scalar};
use crate::errors::{GroupAggError, Result};
use ndarray::{ArrayD, IxDyn};
use serde_json::{json, Value as JsonValue};
use std::path::Path;

/// Labels and data of one reduction call
#[derive(Debug, Clone, PartialEq)]
pub struct ReducePayload {
    pub group_idx: GroupIndex,
    pub array: NumArray,
}

impl ReducePayload {
    /// Payload of a flat list of values
    ///
    /// # Errors
    ///
    /// Returns an error if `dtype` is an integer type and a value is not integral.
    pub fn from_lists(group_idx: Vec<i64>, values: Vec<Scalar>, dtype: Option<DType>) -> Result<Self> {
        let shape = vec![values.len()];
        Ok(Self {
            group_idx: GroupIndex::new(group_idx),
            array: build_array(values, &shape, dtype)?,
        })
    }
}

/// Reads a payload document from `path`
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid payload.
pub fn load_payload(path: &Path) -> Result<ReducePayload> {
    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded payload");
    parse_payload(&text)
}

/// Parses a payload document
///
/// # Errors
///
/// Returns [`GroupAggError::JsonError`] for malformed JSON and
/// [`GroupAggError::InputError`] for missing or mistyped fields.
pub fn parse_payload(text: &str) -> Result<ReducePayload> {
    let doc: JsonValue = serde_json::from_str(text)?;

    let group_idx = field_array(&doc, "group_idx")?
        .iter()
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| GroupAggError::InputError(format!("group label {v} is not an integer")))
        })
        .collect::<Result<Vec<i64>>>()?;

    let values = field_array(&doc, "values")?
        .iter()
        .map(json_scalar)
        .collect::<Result<Vec<Scalar>>>()?;

    let shape = match doc.get("shape") {
        Some(JsonValue::Array(dims)) => dims
            .iter()
            .map(|d| {
                d.as_u64()
                    .and_then(|d| usize::try_from(d).ok())
                    .ok_or_else(|| GroupAggError::InputError(format!("shape entry {d} is not a length")))
            })
            .collect::<Result<Vec<usize>>>()?,
        Some(other) => {
            return Err(GroupAggError::InputError(format!("'shape' must be an array, got {other}")))
        }
        None => vec![values.len()],
    };

    let dtype = match doc.get("dtype") {
        Some(JsonValue::String(name)) => Some(name.parse::<DType>()?),
        Some(other) => {
            return Err(GroupAggError::InputError(format!("'dtype' must be a string, got {other}")))
        }
        None => None,
    };

    Ok(ReducePayload {
        group_idx: GroupIndex::new(group_idx),
        array: build_array(values, &shape, dtype)?,
    })
}

/// Result array as `{"dtype", "shape", "values"}` with values flattened in
/// row-major order; NaN becomes `null`
#[must_use]
pub fn result_to_json(result: &NumArray) -> JsonValue {
    let values: Vec<JsonValue> = match result {
        NumArray::Int32(a) => a.iter().map(|&v| json!(v)).collect(),
        NumArray::Int64(a) => a.iter().map(|&v| json!(v)).collect(),
        NumArray::Float32(a) => a.iter().map(|&v| json!(f64::from(v))).collect(),
        NumArray::Float64(a) => a.iter().map(|&v| json!(v)).collect(),
    };
    json!({
        "dtype": result.dtype().as_str(),
        "shape": result.shape(),
        "values": values,
    })
}

fn field_array<'a>(doc: &'a JsonValue, name: &str) -> Result<&'a Vec<JsonValue>> {
    doc.get(name)
        .and_then(JsonValue::as_array)
        .ok_or_else(|| GroupAggError::InputError(format!("missing '{name}' array")))
}

fn json_scalar(value: &JsonValue) -> Result<Scalar> {
    match value {
        JsonValue::Null => Ok(Scalar::Float(f64::NAN)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| n.as_f64().map(Scalar::Float))
            .ok_or_else(|| GroupAggError::InputError(format!("{n} is out of range"))),
        JsonValue::String(s) => s.parse::<Scalar>(),
        other => Err(GroupAggError::InputError(format!("{other} is not a number"))),
    }
}

fn build_array(values: Vec<Scalar>, shape: &[usize], dtype: Option<DType>) -> Result<NumArray> {
    let dtype = dtype.unwrap_or_else(|| {
        if values.iter().all(|v| matches!(v, Scalar::Int(_))) {
            DType::Int64
        } else {
            DType::Float64
        }
    });

    if dtype.is_float() {
        let data: Vec<f64> = values.iter().map(|v| v.as_f64()).collect();
        let array = ArrayD::from_shape_vec(IxDyn(shape), data)?;
        return Ok(NumArray::Float64(array).cast(dtype));
    }

    let data = values
        .iter()
        .map(|&v| {
            if v.fits(dtype) {
                Ok(v.as_i64())
            } else {
                Err(GroupAggError::InputError(format!("{v} cannot be stored as {dtype}")))
            }
        })
        .collect::<Result<Vec<i64>>>()?;
    let array = ArrayD::from_shape_vec(IxDyn(shape), data)?;
    Ok(NumArray::Int64(array).cast(dtype))
}
