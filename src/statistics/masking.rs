//! NaN masking for the NaN-skipping sum and product
//!
//! Engines drop NaNs before grouping, which turns a group of only NaNs into an
//! absent group. Replacing each NaN with the operation's identity first keeps
//! such a group present: `nansum` of it is 0 and `nanprod` is 1.

use crate::array::NumArray;
use std::borrow::Cow;

/// Additive identity written over NaNs before a sum
pub(crate) const SUM_IDENTITY: f64 = 0.0;
/// Multiplicative identity written over NaNs before a product
pub(crate) const PROD_IDENTITY: f64 = 1.0;

/// Copy of `array` with every NaN replaced by `identity`
///
/// Integer arrays and float arrays without NaNs are returned borrowed.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn mask_nan(array: &NumArray, identity: f64) -> Cow<'_, NumArray> {
    match array {
        NumArray::Float32(a) if a.iter().any(|v| v.is_nan()) => {
            let identity = identity as f32;
            Cow::Owned(NumArray::Float32(
                a.mapv(|v| if v.is_nan() { identity } else { v }),
            ))
        }
        NumArray::Float64(a) if a.iter().any(|v| v.is_nan()) => Cow::Owned(NumArray::Float64(
            a.mapv(|v| if v.is_nan() { identity } else { v }),
        )),
        _ => Cow::Borrowed(array),
    }
}
