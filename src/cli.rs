//! Defines command-line interface options using `clap` for the grouped-reduce tool.

use crate::array::{DType, Scalar};
use crate::errors::{GroupAggError, Result};
use crate::input::{load_payload, ReducePayload};
use crate::options::ReduceOptions;
use clap::Parser;
use std::path::PathBuf;

/// A CLI tool for grouped reductions over an array axis
#[derive(Parser, Debug)]
#[command(
    version,
    name = "grouped-reduce",
    about = "Reduce an array by integer group labels"
)]
pub struct Args {
    /// Statistic to compute, e.g. nansum, nanlen, median (see --list-funcs)
    #[arg(long, required_unless_present = "list_funcs")]
    pub func: Option<String>,

    /// Compute engine: vectorized or compiled
    #[arg(short, long, default_value = "vectorized")]
    pub engine: String,

    /// Comma separated group labels; negative labels are excluded
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with = "input")]
    pub group_idx: Vec<i64>,

    /// Comma separated values of a 1-D array; `nan` is accepted
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with = "input")]
    pub values: Vec<Scalar>,

    /// JSON payload with `group_idx`, `values` and optional `shape` / `dtype`
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Axis to reduce along
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub axis: isize,

    /// Number of output groups. Defaults to the largest label plus one.
    #[arg(long)]
    pub size: Option<usize>,

    /// Value for groups without members
    #[arg(long, allow_negative_numbers = true)]
    pub fill_value: Option<Scalar>,

    /// Output dtype: int32, int64, float32 or float64
    #[arg(long)]
    pub dtype: Option<DType>,

    /// Quantile fraction for quantile / nanquantile
    #[arg(short, long = "quantile")]
    pub q: Option<f64>,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// List the available statistics and exit
    #[arg(long)]
    pub list_funcs: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Reduction options assembled from the flags
    #[must_use]
    pub fn reduce_options(&self) -> ReduceOptions {
        ReduceOptions {
            axis: self.axis,
            size: self.size,
            fill_value: self.fill_value,
            dtype: self.dtype,
            q: self.q,
        }
    }

    /// Input from `--input`, or from `--group-idx` and `--values`
    ///
    /// # Errors
    ///
    /// Returns an error if no input was given or the payload is invalid.
    pub fn payload(&self) -> Result<ReducePayload> {
        if let Some(path) = &self.input {
            return load_payload(path);
        }
        if self.values.is_empty() && self.group_idx.is_empty() {
            return Err(GroupAggError::InputError(
                "provide --input or both --group-idx and --values".to_string(),
            ));
        }
        ReducePayload::from_lists(self.group_idx.clone(), self.values.clone(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_lists() {
        let args = Args::try_parse_from([
            "grouped-reduce",
            "--func",
            "nanlen",
            "--group-idx",
            "-1,0,1",
            "--values",
            "nan,2,3.5",
            "--fill-value",
            "-1",
        ])
        .unwrap();
        assert_eq!(args.func.as_deref(), Some("nanlen"));
        assert_eq!(args.engine, "vectorized");
        assert_eq!(args.group_idx, vec![-1, 0, 1]);
        assert_eq!(args.values.len(), 3);
        assert!(args.values[0].is_nan());
        assert_eq!(args.fill_value, Some(Scalar::Int(-1)));
        assert_eq!(args.axis, -1);
    }

    #[test]
    fn test_reduce_options_from_flags() {
        let args = Args::try_parse_from([
            "grouped-reduce",
            "--func",
            "quantile",
            "-q",
            "0.25",
            "--size",
            "4",
            "--dtype",
            "float32",
            "--axis",
            "0",
        ])
        .unwrap();
        let options = args.reduce_options();
        assert_eq!(options.q, Some(0.25));
        assert_eq!(options.size, Some(4));
        assert_eq!(options.dtype, Some(DType::Float32));
        assert_eq!(options.axis, 0);
    }

    #[test]
    fn test_func_required_unless_listing() {
        assert!(Args::try_parse_from(["grouped-reduce"]).is_err());
        assert!(Args::try_parse_from(["grouped-reduce", "--list-funcs"]).is_ok());
    }

    #[test]
    fn test_payload_requires_input() {
        let args = Args::try_parse_from(["grouped-reduce", "--func", "sum"]).unwrap();
        assert!(matches!(args.payload(), Err(GroupAggError::InputError(_))));
    }
}
