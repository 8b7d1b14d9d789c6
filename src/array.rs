//! Typed array containers, scalar values and group labels
//!
//! Reductions accept arrays whose element type is only known at runtime, so
//! [`NumArray`] wraps one `ndarray::ArrayD` per supported [`DType`]. Kernels never
//! work on the narrow types directly: integer inputs are widened to `i64` and
//! float inputs to `f64` through [`Widened`], and results are cast back to the
//! requested output dtype in one final pass.

use crate::errors::{GroupAggError, Result};
use ndarray::{Array1, ArrayD, CowArray, IxDyn};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Supported element types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DType {
    type Err = GroupAggError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "int32" | "i32" => Ok(Self::Int32),
            "int64" | "i64" | "int" => Ok(Self::Int64),
            "float32" | "f32" => Ok(Self::Float32),
            "float64" | "f64" | "float" => Ok(Self::Float64),
            other => Err(GroupAggError::value(format!("unknown dtype '{other}'"))),
        }
    }
}

/// A single value: a fill value or one group's reduced result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    /// The dtype a bare literal of this kind maps to
    #[must_use]
    pub const fn natural_dtype(self) -> DType {
        match self {
            Self::Int(_) => DType::Int64,
            Self::Float(_) => DType::Float64,
        }
    }

    #[must_use]
    pub fn is_nan(self) -> bool {
        matches!(self, Self::Float(v) if v.is_nan())
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Saturating conversion; NaN becomes 0
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => v,
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(v) => v as i64,
        }
    }

    /// Whether `dtype` can hold this value without losing its meaning
    #[must_use]
    pub fn fits(self, dtype: DType) -> bool {
        match (self, dtype) {
            (_, DType::Float32 | DType::Float64) => true,
            (Self::Int(v), DType::Int32) => i32::try_from(v).is_ok(),
            (Self::Int(_), DType::Int64) => true,
            (Self::Float(v), DType::Int32) => {
                v.is_finite() && v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX)
            }
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(v), DType::Int64) => {
                v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for Scalar {
    type Err = GroupAggError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Self::Int(v));
        }
        match s.to_ascii_lowercase().as_str() {
            "nan" => Ok(Self::Float(f64::NAN)),
            "inf" | "+inf" => Ok(Self::Float(f64::INFINITY)),
            "-inf" => Ok(Self::Float(f64::NEG_INFINITY)),
            _ => s
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|_| GroupAggError::value(format!("'{s}' is not a number"))),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Accumulation lane element: `i64` for integer inputs, `f64` for float inputs
pub trait Element: Copy + PartialOrd + Send + Sync + fmt::Debug + 'static {
    const ZERO: Self;
    const ONE: Self;

    fn is_nan(self) -> bool;
    fn plus(self, other: Self) -> Self;
    fn times(self, other: Self) -> Self;
    fn to_f64(self) -> f64;
    fn into_scalar(self) -> Scalar;
    /// Total order with NaN sorted last
    fn order(&self, other: &Self) -> Ordering;
}

impl Element for i64 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn is_nan(self) -> bool {
        false
    }

    fn plus(self, other: Self) -> Self {
        self.wrapping_add(other)
    }

    fn times(self, other: Self) -> Self {
        self.wrapping_mul(other)
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Int(self)
    }

    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Element for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn times(self, other: Self) -> Self {
        self * other
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn order(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.total_cmp(other),
        }
    }
}

/// Runtime-typed n-dimensional array
#[derive(Debug, Clone, PartialEq)]
pub enum NumArray {
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

/// Widened, possibly borrowed view of a [`NumArray`]
pub(crate) enum Widened<'a> {
    Int(CowArray<'a, i64, IxDyn>),
    Float(CowArray<'a, f64, IxDyn>),
}

impl NumArray {
    #[must_use]
    pub fn dtype(&self) -> DType {
        match self {
            Self::Int32(_) => DType::Int32,
            Self::Int64(_) => DType::Int64,
            Self::Float32(_) => DType::Float32,
            Self::Float64(_) => DType::Float64,
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Int32(a) => a.shape(),
            Self::Int64(a) => a.shape(),
            Self::Float32(a) => a.shape(),
            Self::Float64(a) => a.shape(),
        }
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` as a [`Scalar`], or `None` when out of bounds
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<Scalar> {
        match self {
            Self::Int32(a) => a.get(index).map(|&v| Scalar::from(v)),
            Self::Int64(a) => a.get(index).map(|&v| Scalar::Int(v)),
            Self::Float32(a) => a.get(index).map(|&v| Scalar::Float(f64::from(v))),
            Self::Float64(a) => a.get(index).map(|&v| Scalar::Float(v)),
        }
    }

    /// Every element converted to `f64`
    #[must_use]
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self.widen() {
            Widened::Int(a) => a.mapv(|v| v.to_f64()),
            Widened::Float(a) => a.into_owned(),
        }
    }

    /// Elementwise cast with `as` semantics (float to int truncates, NaN becomes 0)
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn cast(&self, dtype: DType) -> NumArray {
        if self.dtype() == dtype {
            return self.clone();
        }
        match (self.widen(), dtype) {
            (Widened::Int(a), DType::Int32) => Self::Int32(a.mapv(|v| v as i32)),
            (Widened::Int(a), DType::Int64) => Self::Int64(a.into_owned()),
            (Widened::Int(a), DType::Float32) => Self::Float32(a.mapv(|v| v as f32)),
            (Widened::Int(a), DType::Float64) => Self::Float64(a.mapv(|v| v as f64)),
            (Widened::Float(a), DType::Int32) => Self::Int32(a.mapv(|v| v as i32)),
            (Widened::Float(a), DType::Int64) => Self::Int64(a.mapv(|v| v as i64)),
            (Widened::Float(a), DType::Float32) => Self::Float32(a.mapv(|v| v as f32)),
            (Widened::Float(a), DType::Float64) => Self::Float64(a.into_owned()),
        }
    }

    pub(crate) fn widen(&self) -> Widened<'_> {
        match self {
            Self::Int32(a) => Widened::Int(CowArray::from(a.mapv(i64::from))),
            Self::Int64(a) => Widened::Int(CowArray::from(a.view())),
            Self::Float32(a) => Widened::Float(CowArray::from(a.mapv(f64::from))),
            Self::Float64(a) => Widened::Float(CowArray::from(a.view())),
        }
    }

    /// Builds the output array: `None` slots receive `fill`, every value is cast to `dtype`
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn assemble(values: ArrayD<Option<Scalar>>, fill: Scalar, dtype: DType) -> NumArray {
        match dtype {
            DType::Int32 => Self::Int32(values.mapv(|v| v.unwrap_or(fill).as_i64() as i32)),
            DType::Int64 => Self::Int64(values.mapv(|v| v.unwrap_or(fill).as_i64())),
            DType::Float32 => Self::Float32(values.mapv(|v| v.unwrap_or(fill).as_f64() as f32)),
            DType::Float64 => Self::Float64(values.mapv(|v| v.unwrap_or(fill).as_f64())),
        }
    }
}

impl From<ArrayD<i32>> for NumArray {
    fn from(a: ArrayD<i32>) -> Self {
        Self::Int32(a)
    }
}

impl From<ArrayD<i64>> for NumArray {
    fn from(a: ArrayD<i64>) -> Self {
        Self::Int64(a)
    }
}

impl From<ArrayD<f32>> for NumArray {
    fn from(a: ArrayD<f32>) -> Self {
        Self::Float32(a)
    }
}

impl From<ArrayD<f64>> for NumArray {
    fn from(a: ArrayD<f64>) -> Self {
        Self::Float64(a)
    }
}

impl From<Vec<f64>> for NumArray {
    fn from(v: Vec<f64>) -> Self {
        Self::Float64(Array1::from(v).into_dyn())
    }
}

impl From<Vec<i64>> for NumArray {
    fn from(v: Vec<i64>) -> Self {
        Self::Int64(Array1::from(v).into_dyn())
    }
}

/// One integer label per element along the reduced axis; negative labels
/// exclude the element from every group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndex {
    labels: Vec<i64>,
}

impl GroupIndex {
    #[must_use]
    pub fn new(labels: Vec<i64>) -> Self {
        Self { labels }
    }

    #[must_use]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `max(label) + 1` over non-excluded labels, 0 when there are none
    #[must_use]
    pub fn default_size(&self) -> usize {
        self.labels
            .iter()
            .filter_map(|&l| usize::try_from(l).ok())
            .max()
            .map_or(0, |m| m + 1)
    }

    /// Labels as bin positions, checked against `size`
    pub(crate) fn bins(&self, size: usize) -> Result<Vec<Option<usize>>> {
        self.labels
            .iter()
            .map(|&l| match usize::try_from(l) {
                Err(_) => Ok(None),
                Ok(bin) if bin < size => Ok(Some(bin)),
                Ok(bin) => Err(GroupAggError::value(format!(
                    "group label {bin} is out of range for size {size}"
                ))),
            })
            .collect()
    }
}

impl From<Vec<i64>> for GroupIndex {
    fn from(labels: Vec<i64>) -> Self {
        Self::new(labels)
    }
}

impl From<&[i64]> for GroupIndex {
    fn from(labels: &[i64]) -> Self {
        Self::new(labels.to_vec())
    }
}

/// Output shape: `shape` with the extent at `axis` replaced by `size`
pub(crate) fn reduced_shape(shape: &[usize], axis: usize, size: usize) -> Vec<usize> {
    let mut out = shape.to_vec();
    out[axis] = size;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_scalar_fits() {
        assert!(Scalar::Int(-1).fits(DType::Int32));
        assert!(Scalar::Float(3.0).fits(DType::Int64));
        assert!(!Scalar::Float(f64::NAN).fits(DType::Int64));
        assert!(!Scalar::Float(0.5).fits(DType::Int32));
        assert!(!Scalar::Int(i64::MAX).fits(DType::Int32));
        assert!(Scalar::Float(f64::NAN).fits(DType::Float32));
    }

    #[test]
    fn test_scalar_parse() {
        assert_eq!("-1".parse::<Scalar>().unwrap(), Scalar::Int(-1));
        assert_eq!("2.5".parse::<Scalar>().unwrap(), Scalar::Float(2.5));
        assert!("NaN".parse::<Scalar>().unwrap().is_nan());
        assert!("abc".parse::<Scalar>().is_err());
    }

    #[test]
    fn test_dtype_parse() {
        assert_eq!("float32".parse::<DType>().unwrap(), DType::Float32);
        assert_eq!("I64".parse::<DType>().unwrap(), DType::Int64);
        assert!(matches!(
            "complex128".parse::<DType>(),
            Err(GroupAggError::ValueError(_))
        ));
    }

    #[test]
    fn test_group_index_bins() {
        let idx = GroupIndex::new(vec![0, -1, 2, 1]);
        assert_eq!(idx.default_size(), 3);
        assert_eq!(idx.bins(3).unwrap(), vec![Some(0), None, Some(2), Some(1)]);
        assert!(idx.bins(2).is_err());
        assert_eq!(GroupIndex::new(vec![-1, -1]).default_size(), 0);
    }

    #[test]
    fn test_cast_and_widen() {
        let a = NumArray::from(arr1(&[1.7f32, -2.2, f32::NAN]).into_dyn());
        let ints = a.cast(DType::Int64);
        assert_eq!(ints, NumArray::Int64(arr1(&[1i64, -2, 0]).into_dyn()));
        assert_eq!(a.get(&[0]).map(|s| s.as_f64() > 1.69), Some(true));
        assert_eq!(a.get(&[3]), None);
    }

    #[test]
    fn test_nan_orders_last() {
        let mut v = vec![f64::NAN, 2.0, -1.0];
        v.sort_by(Element::order);
        assert_eq!(&v[..2], &[-1.0, 2.0]);
        assert!(v[2].is_nan());
    }
}
