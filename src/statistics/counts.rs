//! Count normalization for `len` and `nanlen`
//!
//! Counts are always computed with a fill of 0 into an `Int64` accumulator.
//! Since 0 then marks absent groups, every zero count is rewritten to the
//! caller's fill value afterwards. A `nanlen` group whose members are all NaN
//! also counts 0, so it receives the fill exactly like an absent group.

use crate::array::{DType, GroupIndex, NumArray, Scalar};
use crate::engine::Engine;
use crate::errors::{GroupAggError, Result};
use crate::options::ReduceOptions;
use crate::statistics::AggFunc;

/// Runs a count through `engine` and applies the caller's fill and dtype
///
/// # Errors
///
/// Returns [`GroupAggError::ValueError`] if the requested dtype cannot hold
/// the fill value, and propagates engine errors unchanged.
pub(crate) fn normalized_count(
    engine: &dyn Engine,
    func: AggFunc,
    group_idx: &GroupIndex,
    array: &NumArray,
    options: &ReduceOptions,
) -> Result<NumArray> {
    let internal = ReduceOptions {
        fill_value: Some(Scalar::Int(0)),
        dtype: Some(DType::Int64),
        ..*options
    };
    let counts = match engine.reduce(group_idx, array, func, &internal)? {
        NumArray::Int64(counts) => counts,
        other => {
            return Err(GroupAggError::EngineError {
                engine: engine.name(),
                message: format!("{func} produced {} instead of int64 counts", other.dtype()),
            })
        }
    };

    let Some(fill) = options.fill_value else {
        let counts = NumArray::Int64(counts);
        return Ok(match options.dtype {
            Some(dtype) => counts.cast(dtype),
            None => counts,
        });
    };

    let dtype = options.dtype.unwrap_or_else(|| fill.natural_dtype());
    if !fill.fits(dtype) {
        return Err(GroupAggError::value(format!(
            "fill value {fill} cannot be represented as {dtype}"
        )));
    }
    let present = counts.mapv(|c| (c != 0).then_some(Scalar::Int(c)));
    Ok(NumArray::assemble(present, fill, dtype))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VectorizedEngine;
    use ndarray::arr1;

    #[test]
    fn test_zero_counts_take_fill() {
        let idx = GroupIndex::new(vec![0, 0, 2]);
        let array = NumArray::from(vec![1.0, f64::NAN, 2.0]);
        let options = ReduceOptions::new().fill_value(f64::NAN);
        let result = normalized_count(&VectorizedEngine, AggFunc::Len, &idx, &array, &options).unwrap();
        let NumArray::Float64(values) = result else {
            panic!("Expected float64 result for a NaN fill");
        };
        assert_eq!(values[0], 2.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 1.0);
    }

    #[test]
    fn test_without_fill_keeps_integer_zeros() {
        let idx = GroupIndex::new(vec![1, 1]);
        let array = NumArray::from(vec![f64::NAN, 2.0]);
        let result =
            normalized_count(&VectorizedEngine, AggFunc::NanLen, &idx, &array, &ReduceOptions::new()).unwrap();
        assert_eq!(result, NumArray::Int64(arr1(&[0, 1]).into_dyn()));
    }

    #[test]
    fn test_fill_must_fit_dtype() {
        let idx = GroupIndex::new(vec![0]);
        let array = NumArray::from(vec![1.0]);
        let options = ReduceOptions::new().fill_value(f64::NAN).dtype(DType::Int32);
        let result = normalized_count(&VectorizedEngine, AggFunc::Len, &idx, &array, &options);
        assert!(matches!(result, Err(GroupAggError::ValueError(_))));
    }
}
