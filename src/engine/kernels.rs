//! Per-group accumulation shared by both engines
//!
//! Engines differ only in how they walk the data. Each element is folded into
//! a [`GroupState`] with [`step`], and every bin is turned into its output
//! value with [`finish`]; a bin nothing was folded into yields `None`.

use crate::array::{Element, Scalar};
use crate::statistics::AggFunc;
use std::cmp::Ordering;

/// Running accumulator for one output bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GroupState<A> {
    acc: A,
    count: u64,
}

impl<A: Element> GroupState<A> {
    pub(crate) fn new(func: AggFunc) -> Self {
        let acc = match func {
            AggFunc::Prod | AggFunc::NanProd => A::ONE,
            _ => A::ZERO,
        };
        Self { acc, count: 0 }
    }
}

/// Folds `value` into `state`
#[inline]
pub(crate) fn step<A: Element>(func: AggFunc, state: &mut GroupState<A>, value: A) {
    if func.skips_nan() && value.is_nan() {
        return;
    }
    state.acc = match func {
        AggFunc::Sum | AggFunc::NanSum | AggFunc::Mean | AggFunc::NanMean => state.acc.plus(value),
        AggFunc::Prod | AggFunc::NanProd => state.acc.times(value),
        AggFunc::SumOfSquares | AggFunc::NanSumOfSquares => state.acc.plus(value.times(value)),
        AggFunc::Min | AggFunc::NanMin => extreme(state, value, Ordering::Less),
        AggFunc::Max | AggFunc::NanMax => extreme(state, value, Ordering::Greater),
        AggFunc::Len | AggFunc::NanLen => state.acc,
    };
    state.count += 1;
}

// NaN is sticky for min/max
fn extreme<A: Element>(state: &GroupState<A>, value: A, wanted: Ordering) -> A {
    if state.count == 0 {
        return value;
    }
    if state.acc.is_nan() {
        return state.acc;
    }
    if value.is_nan() || value.order(&state.acc) == wanted {
        value
    } else {
        state.acc
    }
}

/// Output value of a bin, `None` when the bin received no elements
#[allow(clippy::cast_precision_loss)]
pub(crate) fn finish<A: Element>(func: AggFunc, state: &GroupState<A>) -> Option<Scalar> {
    if state.count == 0 {
        return None;
    }
    Some(match func {
        AggFunc::Mean | AggFunc::NanMean => Scalar::Float(state.acc.to_f64() / state.count as f64),
        AggFunc::Len | AggFunc::NanLen => Scalar::Int(i64::try_from(state.count).unwrap_or(i64::MAX)),
        _ => state.acc.into_scalar(),
    })
}
