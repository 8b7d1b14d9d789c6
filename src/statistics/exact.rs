//! Exact scalar statistics over one group's values
//!
//! Median, quantile and mode cannot be folded element by element, so they are
//! evaluated on the full value slice of a group by a [`ScalarStat`] backend.

use super::operations::OrderStat;
use crate::array::{Element, Scalar};
use crate::errors::{GroupAggError, Result};

/// How NaN members of a group are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NanPolicy {
    /// Any NaN member makes the statistic NaN
    Propagate,
    /// NaN members are removed before computing
    Omit,
}

/// Capability computing one order statistic over a slice of group members
pub trait ScalarStat: Sync {
    /// Evaluates `stat` over `values`, which may be reordered in place
    ///
    /// # Errors
    ///
    /// Returns an error if the statistic's parameters are invalid.
    fn evaluate<A: Element>(&self, stat: OrderStat, values: &mut Vec<A>, policy: NanPolicy) -> Result<Scalar>;
}

/// Sort-based exact backend
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactStats;

impl ScalarStat for ExactStats {
    fn evaluate<A: Element>(&self, stat: OrderStat, values: &mut Vec<A>, policy: NanPolicy) -> Result<Scalar> {
        if let OrderStat::Quantile(q) = stat {
            check_quantile(q)?;
        }
        if policy == NanPolicy::Propagate && values.iter().any(|v| v.is_nan()) {
            return Ok(Scalar::Float(f64::NAN));
        }
        values.retain(|v| !v.is_nan());
        if values.is_empty() {
            return Ok(Scalar::Float(f64::NAN));
        }
        values.sort_unstable_by(Element::order);

        Ok(match stat {
            OrderStat::Median => Scalar::Float(median(values)),
            OrderStat::Quantile(q) => Scalar::Float(quantile(values, q)),
            OrderStat::Mode => mode(values).into_scalar(),
        })
    }
}

/// Fails unless `q` is a finite fraction in `[0, 1]`
pub(crate) fn check_quantile(q: f64) -> Result<()> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(GroupAggError::value(format!(
            "quantile fraction must be within [0, 1], got {q}"
        )))
    }
}

fn median<A: Element>(sorted: &[A]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid].to_f64()
    } else {
        (sorted[mid - 1].to_f64() + sorted[mid].to_f64()) / 2.0
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantile<A: Element>(sorted: &[A], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    lerp(sorted[lower].to_f64(), sorted[upper].to_f64(), position - position.floor())
}

// Interpolates from the nearer end
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Most frequent value of a sorted slice; the first (smallest) wins ties
fn mode<A: Element>(sorted: &[A]) -> A {
    let mut best = sorted[0];
    let mut best_count = 0;
    let mut run_start = 0;
    for i in 1..=sorted.len() {
        if i == sorted.len() || sorted[i] != sorted[run_start] {
            let count = i - run_start;
            if count > best_count {
                best = sorted[run_start];
                best_count = count;
            }
            run_start = i;
        }
    }
    best
}
