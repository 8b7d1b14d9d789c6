//! grouped_reduce: per-group statistics over an array axis
//!
//! Given one integer label per element along an axis, the crate reduces an
//! n-dimensional array into one value per group for a fixed catalog of
//! statistics: sum, product, sum of squares, mean, min, max, count, median,
//! quantile, mode, and NaN-aware variants of each.
//!
//! ## Key Features
//!
//! - **Interchangeable Engines**: a bincount-style scatter engine and a lane-parallel
//!   engine built on Rayon, selected by name per call
//! - **Uniform Contract**: every statistic shares one signature and the same
//!   `size` / `fill_value` / `dtype` semantics regardless of engine
//! - **NaN Handling**: `nansum` / `nanprod` of an all-NaN group are 0 / 1 instead
//!   of being reported as absent
//! - **Exact Order Statistics**: median, quantile and mode are always computed by
//!   the exact per-group backend
//!
//! ## Module Organization
//!
//! - [`array`]: runtime-typed arrays, scalars and group labels
//! - [`options`]: call options and their resolved form
//! - [`engine`]: compute engine trait, implementations and selection
//! - [`statistics`]: the reduction catalog and the exact backend
//! - [`input`]: JSON payloads for the command-line front end
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust
//! use grouped_reduce::prelude::*;
//!
//! let group_idx = GroupIndex::new(vec![0, 0, 1, 1, 1]);
//! let array = NumArray::from(vec![1.0, 2.0, 3.0, f64::NAN, 5.0]);
//!
//! let sums = grouped_reduce::statistics::nansum(&group_idx, &array, "vectorized", &ReduceOptions::new()).unwrap();
//! assert_eq!(sums, NumArray::from(vec![3.0, 8.0]));
//! ```

// Core modules
pub mod array;
pub mod engine;
pub mod errors;
pub mod input;
pub mod options;
pub mod parallel;
pub mod statistics;

// Command-line front end
pub mod cli;

// Direct re-exports for the public API
pub use array::{DType, GroupIndex, NumArray, Scalar};
pub use engine::{select_engine, CompiledEngine, Engine, EngineKind, VectorizedEngine};
pub use errors::{GroupAggError, Result};
pub use options::{ReduceOptions, ReductionSpec};
pub use statistics::aggregate;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::array::{DType, GroupIndex, NumArray, Scalar};
    pub use crate::engine::{select_engine, Engine, EngineKind};
    pub use crate::errors::{GroupAggError, Result};
    pub use crate::options::ReduceOptions;
    pub use crate::parallel::ParallelConfig;
    pub use crate::statistics::{aggregate, AggFunc, NanPolicy, OrderStat};
}
