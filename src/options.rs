//! Call options and their resolved, immutable form
//!
//! [`ReduceOptions`] is what a caller passes to any catalog entry. Before an
//! engine or the exact backend touches data, the options are resolved into a
//! [`ReductionSpec`]: axis normalized, group count fixed, fill value and
//! output dtype decided.

use crate::array::{DType, GroupIndex, NumArray, Scalar};
use crate::errors::{GroupAggError, Result};

/// Fill value used when the caller does not supply one
pub const DEFAULT_FILL: Scalar = Scalar::Int(0);

/// Caller-facing options shared by every catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduceOptions {
    /// Axis to reduce along; negative values count from the end
    pub axis: isize,
    /// Number of output groups; defaults to `max(group_idx) + 1`
    pub size: Option<usize>,
    /// Value written for groups with no members
    pub fill_value: Option<Scalar>,
    /// Output element type
    pub dtype: Option<DType>,
    /// Quantile fraction, read only by quantile entries
    pub q: Option<f64>,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            axis: -1,
            size: None,
            fill_value: None,
            dtype: None,
            q: None,
        }
    }
}

impl ReduceOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn axis(mut self, axis: isize) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn fill_value(mut self, fill_value: impl Into<Scalar>) -> Self {
        self.fill_value = Some(fill_value.into());
        self
    }

    #[must_use]
    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    #[must_use]
    pub fn q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }
}

/// How a reduction picks its output dtype when the caller does not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// Keep the input dtype; integer input with a fill it cannot hold becomes `Float64`
    PreserveInput,
    /// Float inputs keep their dtype, integer inputs produce `Float64`
    FloatResult,
    /// `Int64` counts, or `Float64` when the fill is not integral
    Count,
}

impl Promotion {
    #[must_use]
    pub fn output_dtype(self, input: DType, fill: Scalar) -> DType {
        match self {
            Self::PreserveInput if fill.fits(input) => input,
            Self::PreserveInput => DType::Float64,
            Self::FloatResult if input.is_float() => input,
            Self::FloatResult => DType::Float64,
            Self::Count if fill.fits(DType::Int64) => DType::Int64,
            Self::Count => DType::Float64,
        }
    }
}

/// Fully resolved parameters of one aggregation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionSpec {
    pub func: &'static str,
    pub axis: usize,
    pub size: usize,
    pub fill_value: Scalar,
    pub dtype: DType,
}

impl ReductionSpec {
    /// Validates `options` against the inputs and fills in every default
    ///
    /// # Errors
    ///
    /// Returns [`GroupAggError::ValueError`] if:
    /// - the array is 0-dimensional or the axis is out of bounds
    /// - `group_idx` does not have one label per element along the axis
    /// - an explicit dtype cannot hold the fill value
    pub fn resolve(
        func: &'static str,
        promotion: Promotion,
        group_idx: &GroupIndex,
        array: &NumArray,
        options: &ReduceOptions,
        default_fill: Scalar,
    ) -> Result<Self> {
        let axis = normalize_axis(options.axis, array.ndim())?;
        let extent = array.shape()[axis];
        if group_idx.len() != extent {
            return Err(GroupAggError::value(format!(
                "group_idx has {} labels but axis {axis} has length {extent}",
                group_idx.len()
            )));
        }

        let size = options.size.unwrap_or_else(|| group_idx.default_size());
        let fill_value = options.fill_value.unwrap_or(default_fill);
        let dtype = match options.dtype {
            Some(dtype) if !fill_value.fits(dtype) => {
                return Err(GroupAggError::value(format!(
                    "fill value {fill_value} cannot be represented as {dtype}"
                )));
            }
            Some(dtype) => dtype,
            None => promotion.output_dtype(array.dtype(), fill_value),
        };

        Ok(Self {
            func,
            axis,
            size,
            fill_value,
            dtype,
        })
    }
}

fn normalize_axis(axis: isize, ndim: usize) -> Result<usize> {
    if ndim == 0 {
        return Err(GroupAggError::value("cannot reduce a 0-dimensional array"));
    }
    let resolved = if axis < 0 {
        ndim.checked_sub(axis.unsigned_abs())
    } else {
        Some(axis.unsigned_abs()).filter(|&a| a < ndim)
    };
    resolved.ok_or_else(|| {
        GroupAggError::value(format!(
            "Axis {axis} is out of bounds for array with {ndim} dimensions"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
        assert_eq!(normalize_axis(-3, 3).unwrap(), 0);
        assert_eq!(normalize_axis(1, 3).unwrap(), 1);
        assert!(normalize_axis(3, 3).is_err());
        assert!(normalize_axis(-4, 3).is_err());
        assert!(normalize_axis(0, 0).is_err());
    }

    #[test]
    fn test_promotion_rules() {
        let nan = Scalar::Float(f64::NAN);
        assert_eq!(Promotion::PreserveInput.output_dtype(DType::Int32, Scalar::Int(0)), DType::Int32);
        assert_eq!(Promotion::PreserveInput.output_dtype(DType::Int32, nan), DType::Float64);
        assert_eq!(Promotion::PreserveInput.output_dtype(DType::Float32, nan), DType::Float32);
        assert_eq!(Promotion::FloatResult.output_dtype(DType::Int64, Scalar::Int(0)), DType::Float64);
        assert_eq!(Promotion::FloatResult.output_dtype(DType::Float32, Scalar::Int(0)), DType::Float32);
        assert_eq!(Promotion::Count.output_dtype(DType::Float32, Scalar::Int(-1)), DType::Int64);
        assert_eq!(Promotion::Count.output_dtype(DType::Float32, nan), DType::Float64);
    }

    #[test]
    fn test_resolve_defaults() {
        let idx = GroupIndex::new(vec![0, 2, 2]);
        let array = NumArray::from(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn());
        let spec = ReductionSpec::resolve(
            "sum",
            Promotion::PreserveInput,
            &idx,
            &array,
            &ReduceOptions::new(),
            DEFAULT_FILL,
        )
        .unwrap();
        assert_eq!(spec.axis, 1);
        assert_eq!(spec.size, 3);
        assert_eq!(spec.fill_value, Scalar::Int(0));
        assert_eq!(spec.dtype, DType::Float64);
    }

    #[test]
    fn test_resolve_rejects_bad_inputs() {
        let array = NumArray::from(arr1(&[1i64, 2, 3]).into_dyn());

        let short = GroupIndex::new(vec![0, 1]);
        let err = ReductionSpec::resolve(
            "sum",
            Promotion::PreserveInput,
            &short,
            &array,
            &ReduceOptions::new(),
            DEFAULT_FILL,
        );
        assert!(matches!(err, Err(GroupAggError::ValueError(_))));

        let idx = GroupIndex::new(vec![0, 1, 1]);
        let nan_into_int = ReduceOptions::new().fill_value(f64::NAN).dtype(DType::Int64);
        let err = ReductionSpec::resolve(
            "sum",
            Promotion::PreserveInput,
            &idx,
            &array,
            &nan_into_int,
            DEFAULT_FILL,
        );
        assert!(matches!(err, Err(GroupAggError::ValueError(_))));
    }
}
