//! Grouped statistical reductions
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`operations`]: engine function names and order statistics
//! - [`catalog`]: one public entry point per statistic, plus name lookup
//! - [`exact`]: the exact scalar backend used for median, quantile and mode
//! - [`order`]: per-group evaluation through the exact backend
//! - `masking`: identity substitution for `nansum` and `nanprod`
//! - `counts`: fill and dtype normalization for `len` and `nanlen`

pub mod catalog;
mod counts;
pub mod exact;
mod masking;
pub mod operations;
pub mod order;

// Re-export the main types and functions for convenience
pub use catalog::{
    aggregate, len, lookup, max, mean, median, min, mode, nanlen, nanmax, nanmean, nanmedian,
    nanmin, nanmode, nanprod, nanquantile, nansum, nansum_of_squares, prod, quantile,
    statistic_names, sum, sum_of_squares, ReduceFn, CATALOG,
};
pub use exact::{ExactStats, NanPolicy, ScalarStat};
pub use operations::{AggFunc, OrderStat};
pub use order::order_reduce;
