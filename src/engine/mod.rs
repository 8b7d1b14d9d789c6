//! Interchangeable compute engines for vectorizable group reductions
//!
//! An [`Engine`] reduces an array by group label for any [`AggFunc`]. Two
//! implementations exist and must agree on results:
//! - [`vectorized`]: one bincount-style scatter pass over the whole array
//! - [`compiled`]: an independent accumulation loop per lane, run in parallel
//!
//! Both follow bincount conventions for NaN: the NaN-skipping functions drop
//! NaN elements before grouping, so a group holding only NaNs is reported as
//! absent and receives the fill value.

pub mod compiled;
mod kernels;
pub mod vectorized;

pub use compiled::CompiledEngine;
pub use vectorized::VectorizedEngine;

use crate::array::{GroupIndex, NumArray, Scalar};
use crate::errors::{GroupAggError, Result};
use crate::options::{ReduceOptions, ReductionSpec, DEFAULT_FILL};
use crate::parallel::ParallelConfig;
use crate::statistics::AggFunc;
use std::fmt;
use std::str::FromStr;

/// A backend able to reduce an array by group label
pub trait Engine: Send + Sync {
    /// Identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Fill written to absent groups when the caller does not choose one
    fn default_fill(&self, _func: AggFunc) -> Scalar {
        DEFAULT_FILL
    }

    /// Reduces `array` along `options.axis` into one value per group label
    ///
    /// # Errors
    ///
    /// Returns an error if the options do not match the inputs (see
    /// [`ReductionSpec::resolve`]), if a label is outside `[0, size)`, or if the
    /// engine itself fails.
    fn reduce(
        &self,
        group_idx: &GroupIndex,
        array: &NumArray,
        func: AggFunc,
        options: &ReduceOptions,
    ) -> Result<NumArray>;

    /// Like [`Engine::reduce`] with the function given by name
    ///
    /// # Errors
    ///
    /// Returns [`GroupAggError::ConfigurationError`] if this engine does not
    /// implement a function called `func`.
    fn reduce_named(
        &self,
        group_idx: &GroupIndex,
        array: &NumArray,
        func: &str,
        options: &ReduceOptions,
    ) -> Result<NumArray> {
        let func = func.parse::<AggFunc>().map_err(|_| {
            GroupAggError::config(format!(
                "engine '{}' does not support function '{func}'",
                self.name()
            ))
        })?;
        self.reduce(group_idx, array, func, options)
    }
}

/// Resolves options and label bins the same way for every engine
pub(crate) fn prepare(
    engine: &dyn Engine,
    group_idx: &GroupIndex,
    array: &NumArray,
    func: AggFunc,
    options: &ReduceOptions,
) -> Result<(ReductionSpec, Vec<Option<usize>>)> {
    let spec = ReductionSpec::resolve(
        func.as_str(),
        func.promotion(),
        group_idx,
        array,
        options,
        engine.default_fill(func),
    )?;
    let bins = group_idx.bins(spec.size)?;
    tracing::trace!(
        engine = engine.name(),
        func = spec.func,
        shape = ?array.shape(),
        axis = spec.axis,
        size = spec.size,
        dtype = %spec.dtype,
        "reducing"
    );
    Ok((spec, bins))
}

/// Closed set of engine identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Vectorized,
    Compiled,
}

static VECTORIZED: VectorizedEngine = VectorizedEngine;
static COMPILED: CompiledEngine = CompiledEngine::new(ParallelConfig::new(None));

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [Self::Vectorized, Self::Compiled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vectorized => "vectorized",
            Self::Compiled => "compiled",
        }
    }

    /// Shared engine instance for this identifier
    #[must_use]
    pub fn engine(self) -> &'static dyn Engine {
        match self {
            Self::Vectorized => &VECTORIZED,
            Self::Compiled => &COMPILED,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = GroupAggError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vectorized" | "numpy" => Ok(Self::Vectorized),
            "compiled" | "numba" => Ok(Self::Compiled),
            other => Err(GroupAggError::config(format!(
                "unknown engine '{other}', expected one of: vectorized, compiled"
            ))),
        }
    }
}

/// Looks up the engine for an identifier
///
/// # Errors
///
/// Returns [`GroupAggError::ConfigurationError`] for unknown identifiers.
pub fn select_engine(name: &str) -> Result<&'static dyn Engine> {
    let kind = name.parse::<EngineKind>()?;
    tracing::debug!(requested = name, engine = kind.as_str(), "selected engine");
    Ok(kind.engine())
}
