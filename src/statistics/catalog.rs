//! Public reduction catalog
//!
//! Every statistic is exposed as a function with the same shape,
//! `(group_idx, array, engine, options) -> Result<NumArray>`, so a caller can
//! pick any of them by name through [`CATALOG`] or [`aggregate`].
//!
//! Routing:
//! - `nansum` / `nanprod` mask NaNs with the identity, then run `sum` / `prod`
//! - `len` / `nanlen` go through the count normalizer
//! - median, quantile and mode use the exact backend whatever `engine` says
//! - everything else is passed to the selected engine as is

use super::counts::normalized_count;
use super::exact::{check_quantile, ExactStats, NanPolicy};
use super::masking::{mask_nan, PROD_IDENTITY, SUM_IDENTITY};
use super::operations::{AggFunc, OrderStat};
use super::order::order_reduce;
use crate::array::{GroupIndex, NumArray};
use crate::engine::{select_engine, Engine};
use crate::errors::{GroupAggError, Result};
use crate::options::ReduceOptions;

/// Signature shared by every catalog entry
pub type ReduceFn = fn(&GroupIndex, &NumArray, &str, &ReduceOptions) -> Result<NumArray>;

/// Statistic name to implementation
pub const CATALOG: &[(&str, ReduceFn)] = &[
    ("sum", sum),
    ("nansum", nansum),
    ("prod", prod),
    ("nanprod", nanprod),
    ("sum_of_squares", sum_of_squares),
    ("nansum_of_squares", nansum_of_squares),
    ("mean", mean),
    ("nanmean", nanmean),
    ("min", min),
    ("nanmin", nanmin),
    ("max", max),
    ("nanmax", nanmax),
    ("len", len),
    ("nanlen", nanlen),
    ("median", median),
    ("nanmedian", nanmedian),
    ("quantile", quantile),
    ("nanquantile", nanquantile),
    ("mode", mode),
    ("nanmode", nanmode),
];

/// Names accepted by [`aggregate`]
pub fn statistic_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

/// Looks up a catalog entry by name
///
/// # Errors
///
/// Returns [`GroupAggError::ConfigurationError`] for unknown names.
pub fn lookup(name: &str) -> Result<ReduceFn> {
    CATALOG
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, f)| *f)
        .ok_or_else(|| GroupAggError::config(format!("unknown statistic '{name}'")))
}

/// Runs the statistic called `name`
///
/// # Errors
///
/// Returns [`GroupAggError::ConfigurationError`] for an unknown statistic or
/// engine, and any error of the entry itself.
pub fn aggregate(
    name: &str,
    group_idx: &GroupIndex,
    array: &NumArray,
    engine: &str,
    options: &ReduceOptions,
) -> Result<NumArray> {
    let entry = lookup(name)?;
    tracing::debug!(statistic = name, engine, shape = ?array.shape(), "aggregate");
    entry(group_idx, array, engine, options)
}

fn native(
    func: AggFunc,
    group_idx: &GroupIndex,
    array: &NumArray,
    engine: &str,
    options: &ReduceOptions,
) -> Result<NumArray> {
    select_engine(engine)?.reduce(group_idx, array, func, options)
}

fn exact(
    stat: OrderStat,
    policy: NanPolicy,
    group_idx: &GroupIndex,
    array: &NumArray,
    options: &ReduceOptions,
) -> Result<NumArray> {
    order_reduce(&ExactStats, group_idx, array, stat, policy, options)
}

fn quantile_fraction(options: &ReduceOptions) -> Result<f64> {
    let q = options
        .q
        .ok_or_else(|| GroupAggError::value("quantile requires a fraction q"))?;
    check_quantile(q)?;
    Ok(q)
}

/// Group sum; NaN members make the group NaN
///
/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn sum(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::Sum, group_idx, array, engine, options)
}

/// Group sum ignoring NaN; a group of only NaNs sums to 0
///
/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn nansum(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    let masked = mask_nan(array, SUM_IDENTITY);
    native(AggFunc::Sum, group_idx, &masked, engine, options)
}

/// Group product; NaN members make the group NaN
///
/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn prod(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::Prod, group_idx, array, engine, options)
}

/// Group product ignoring NaN; a group of only NaNs multiplies to 1
///
/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn nanprod(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    let masked = mask_nan(array, PROD_IDENTITY);
    native(AggFunc::Prod, group_idx, &masked, engine, options)
}

/// Group sum of squared values
///
/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn sum_of_squares(
    group_idx: &GroupIndex,
    array: &NumArray,
    engine: &str,
    options: &ReduceOptions,
) -> Result<NumArray> {
    native(AggFunc::SumOfSquares, group_idx, array, engine, options)
}

/// Group sum of squared non-NaN values
///
/// Unlike [`nansum`] this uses the engine's native NaN handling, so a group
/// of only NaNs receives the fill value.
///
/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn nansum_of_squares(
    group_idx: &GroupIndex,
    array: &NumArray,
    engine: &str,
    options: &ReduceOptions,
) -> Result<NumArray> {
    native(AggFunc::NanSumOfSquares, group_idx, array, engine, options)
}

/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn mean(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::Mean, group_idx, array, engine, options)
}

/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn nanmean(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::NanMean, group_idx, array, engine, options)
}

/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn min(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::Min, group_idx, array, engine, options)
}

/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn nanmin(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::NanMin, group_idx, array, engine, options)
}

/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn max(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::Max, group_idx, array, engine, options)
}

/// # Errors
///
/// Fails on an unknown engine or invalid options.
pub fn nanmax(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    native(AggFunc::NanMax, group_idx, array, engine, options)
}

/// Number of members per group
///
/// Absent groups report the fill value when one is given, 0 otherwise.
///
/// # Errors
///
/// Fails on an unknown engine, invalid options, or a fill the dtype cannot hold.
pub fn len(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    normalized_count(select_engine(engine)?, AggFunc::Len, group_idx, array, options)
}

/// Number of non-NaN members per group
///
/// A group whose members are all NaN counts 0 and is therefore reported
/// with the fill value, the same as an absent group.
///
/// # Errors
///
/// Fails on an unknown engine, invalid options, or a fill the dtype cannot hold.
pub fn nanlen(group_idx: &GroupIndex, array: &NumArray, engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    normalized_count(select_engine(engine)?, AggFunc::NanLen, group_idx, array, options)
}

/// Group median; `engine` is ignored
///
/// # Errors
///
/// Fails on invalid options.
pub fn median(group_idx: &GroupIndex, array: &NumArray, _engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    exact(OrderStat::Median, NanPolicy::Propagate, group_idx, array, options)
}

/// Group median ignoring NaN; `engine` is ignored
///
/// # Errors
///
/// Fails on invalid options.
pub fn nanmedian(group_idx: &GroupIndex, array: &NumArray, _engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    exact(OrderStat::Median, NanPolicy::Omit, group_idx, array, options)
}

/// Group quantile at `options.q`; `engine` is ignored
///
/// # Errors
///
/// Returns [`GroupAggError::ValueError`] if `q` is missing or outside `[0, 1]`.
pub fn quantile(group_idx: &GroupIndex, array: &NumArray, _engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    let q = quantile_fraction(options)?;
    exact(OrderStat::Quantile(q), NanPolicy::Propagate, group_idx, array, options)
}

/// Group quantile at `options.q` ignoring NaN; `engine` is ignored
///
/// # Errors
///
/// Returns [`GroupAggError::ValueError`] if `q` is missing or outside `[0, 1]`.
pub fn nanquantile(
    group_idx: &GroupIndex,
    array: &NumArray,
    _engine: &str,
    options: &ReduceOptions,
) -> Result<NumArray> {
    let q = quantile_fraction(options)?;
    exact(OrderStat::Quantile(q), NanPolicy::Omit, group_idx, array, options)
}

/// Most frequent value per group, smallest on ties; any NaN member makes
/// the group NaN. `engine` is ignored.
///
/// # Errors
///
/// Fails on invalid options.
pub fn mode(group_idx: &GroupIndex, array: &NumArray, _engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    exact(OrderStat::Mode, NanPolicy::Propagate, group_idx, array, options)
}

/// Most frequent non-NaN value per group, smallest on ties. `engine` is ignored.
///
/// # Errors
///
/// Fails on invalid options.
pub fn nanmode(group_idx: &GroupIndex, array: &NumArray, _engine: &str, options: &ReduceOptions) -> Result<NumArray> {
    exact(OrderStat::Mode, NanPolicy::Omit, group_idx, array, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = statistic_names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_unknown_statistic() {
        assert!(matches!(lookup("argmax"), Err(GroupAggError::ConfigurationError(_))));
    }

    #[test]
    fn test_quantile_requires_q() {
        let idx = GroupIndex::new(vec![0]);
        let array = NumArray::from(vec![1.0]);
        let result = quantile(&idx, &array, "vectorized", &ReduceOptions::new());
        assert!(matches!(result, Err(GroupAggError::ValueError(_))));
        let result = nanquantile(&idx, &array, "vectorized", &ReduceOptions::new().q(1.01));
        assert!(matches!(result, Err(GroupAggError::ValueError(_))));
    }
}
