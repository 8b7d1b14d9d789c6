//! Core statistical operations
//!
//! This module defines the function names the compute engines understand and
//! the order statistics that only the exact backend computes.

use crate::errors::{GroupAggError, Result};
use crate::options::Promotion;
use std::fmt;
use std::str::FromStr;

/// Reductions implemented natively by every engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Sum,
    NanSum,
    Prod,
    NanProd,
    SumOfSquares,
    NanSumOfSquares,
    Mean,
    NanMean,
    Min,
    NanMin,
    Max,
    NanMax,
    /// Number of group members
    Len,
    /// Number of non-NaN group members
    NanLen,
}

impl AggFunc {
    pub const ALL: [AggFunc; 14] = [
        Self::Sum,
        Self::NanSum,
        Self::Prod,
        Self::NanProd,
        Self::SumOfSquares,
        Self::NanSumOfSquares,
        Self::Mean,
        Self::NanMean,
        Self::Min,
        Self::NanMin,
        Self::Max,
        Self::NanMax,
        Self::Len,
        Self::NanLen,
    ];

    /// Engine-level name of the function
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::NanSum => "nansum",
            Self::Prod => "prod",
            Self::NanProd => "nanprod",
            Self::SumOfSquares => "sumofsquares",
            Self::NanSumOfSquares => "nansumofsquares",
            Self::Mean => "mean",
            Self::NanMean => "nanmean",
            Self::Min => "min",
            Self::NanMin => "nanmin",
            Self::Max => "max",
            Self::NanMax => "nanmax",
            Self::Len => "len",
            Self::NanLen => "nanlen",
        }
    }

    /// NaN-skipping variants drop NaN elements before grouping
    #[must_use]
    pub const fn skips_nan(self) -> bool {
        matches!(
            self,
            Self::NanSum
                | Self::NanProd
                | Self::NanSumOfSquares
                | Self::NanMean
                | Self::NanMin
                | Self::NanMax
                | Self::NanLen
        )
    }

    #[must_use]
    pub const fn promotion(self) -> Promotion {
        match self {
            Self::Mean | Self::NanMean => Promotion::FloatResult,
            Self::Len | Self::NanLen => Promotion::Count,
            _ => Promotion::PreserveInput,
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggFunc {
    type Err = GroupAggError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|func| func.as_str() == s)
            .ok_or_else(|| {
                GroupAggError::config(format!("function '{s}' is not supported by the compute engines"))
            })
    }
}

/// Statistics that need every member of a group at once
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderStat {
    Median,
    /// Quantile at fraction `q` in `[0, 1]`
    Quantile(f64),
    Mode,
}

impl OrderStat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::Quantile(_) => "quantile",
            Self::Mode => "mode",
        }
    }

    /// Mode keeps the input dtype, the interpolating statistics produce floats
    #[must_use]
    pub const fn promotion(self) -> Promotion {
        match self {
            Self::Mode => Promotion::PreserveInput,
            Self::Median | Self::Quantile(_) => Promotion::FloatResult,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agg_func_names_round_trip() {
        for func in AggFunc::ALL {
            assert_eq!(func.as_str().parse::<AggFunc>().unwrap(), func);
        }
    }

    #[test]
    fn test_order_statistics_are_not_engine_functions() {
        for name in ["median", "nanquantile", "mode", "argmax"] {
            assert!(matches!(
                name.parse::<AggFunc>(),
                Err(GroupAggError::ConfigurationError(_))
            ));
        }
    }

    #[test]
    fn test_nan_variants() {
        assert!(AggFunc::NanLen.skips_nan());
        assert!(!AggFunc::Len.skips_nan());
        assert!(!AggFunc::Sum.skips_nan());
        assert_eq!(AggFunc::Mean.promotion(), Promotion::FloatResult);
        assert_eq!(OrderStat::Mode.promotion(), Promotion::PreserveInput);
    }
}
