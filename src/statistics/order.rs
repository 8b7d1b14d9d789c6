//! Exact per-group path for median, quantile and mode
//!
//! No engine implements these statistics, so they bypass engine selection:
//! each lane's members are bucketed by label and every non-empty bucket is
//! handed to a [`ScalarStat`] backend. Lanes are processed in parallel.

use super::exact::{NanPolicy, ScalarStat};
use super::operations::OrderStat;
use crate::array::{reduced_shape, Element, GroupIndex, NumArray, Scalar, Widened};
use crate::errors::Result;
use crate::options::{ReduceOptions, ReductionSpec, DEFAULT_FILL};
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};

/// Computes `stat` for every group with `backend`
///
/// Groups without members receive the fill value; groups whose members are
/// all removed by [`NanPolicy::Omit`] get the backend's empty result (NaN).
///
/// # Errors
///
/// Returns an error if the options do not match the inputs, and propagates
/// backend errors unchanged.
pub fn order_reduce<S: ScalarStat>(
    backend: &S,
    group_idx: &GroupIndex,
    array: &NumArray,
    stat: OrderStat,
    policy: NanPolicy,
    options: &ReduceOptions,
) -> Result<NumArray> {
    let spec = ReductionSpec::resolve(
        stat.as_str(),
        stat.promotion(),
        group_idx,
        array,
        options,
        DEFAULT_FILL,
    )?;
    let bins = group_idx.bins(spec.size)?;
    tracing::trace!(stat = spec.func, ?policy, shape = ?array.shape(), size = spec.size, "exact reduction");

    // mode is computed in the array's own element class so integer groups
    // report an integer mode
    let values = match array.widen() {
        Widened::Int(a) => per_group(backend, a.view(), &bins, stat, policy, &spec)?,
        Widened::Float(a) => per_group(backend, a.view(), &bins, stat, policy, &spec)?,
    };
    Ok(NumArray::assemble(values, spec.fill_value, spec.dtype))
}

fn per_group<A: Element, S: ScalarStat>(
    backend: &S,
    values: ArrayViewD<'_, A>,
    bins: &[Option<usize>],
    stat: OrderStat,
    policy: NanPolicy,
    spec: &ReductionSpec,
) -> Result<ArrayD<Option<Scalar>>> {
    let axis = Axis(spec.axis);
    let size = spec.size;
    let mut out = ArrayD::from_elem(reduced_shape(values.shape(), spec.axis, size), None);

    let status = Zip::from(out.lanes_mut(axis))
        .and(values.lanes(axis))
        .par_map_collect(|mut out_lane, lane| -> Result<()> {
            let mut buckets: Vec<Vec<A>> = vec![Vec::new(); size];
            for (&value, bin) in lane.iter().zip(bins) {
                if let Some(bin) = *bin {
                    buckets[bin].push(value);
                }
            }
            for (slot, bucket) in out_lane.iter_mut().zip(buckets.iter_mut()) {
                if !bucket.is_empty() {
                    *slot = Some(backend.evaluate(stat, bucket, policy)?);
                }
            }
            Ok(())
        });

    status.into_raw_vec().into_iter().collect::<Result<()>>()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DType;
    use crate::statistics::exact::ExactStats;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_median_per_row() {
        let idx = GroupIndex::new(vec![0, 1, 0, 0]);
        let array = NumArray::from(arr2(&[[1.0, 9.0, 3.0, 2.0], [4.0, 8.0, f64::NAN, 6.0]]).into_dyn());
        let result = order_reduce(
            &ExactStats,
            &idx,
            &array,
            OrderStat::Median,
            NanPolicy::Omit,
            &ReduceOptions::new(),
        )
        .unwrap();
        assert_eq!(result, NumArray::Float64(arr2(&[[2.0, 9.0], [5.0, 8.0]]).into_dyn()));
    }

    #[test]
    fn test_integer_mode_keeps_dtype() {
        let idx = GroupIndex::new(vec![0, 0, 0, 2]);
        let array = NumArray::Int32(arr1(&[4, 4, 1, 7]).into_dyn());
        let result = order_reduce(
            &ExactStats,
            &idx,
            &array,
            OrderStat::Mode,
            NanPolicy::Propagate,
            &ReduceOptions::new().fill_value(-1),
        )
        .unwrap();
        assert_eq!(result.dtype(), DType::Int32);
        assert_eq!(result, NumArray::Int32(arr1(&[4, -1, 7]).into_dyn()));
    }

    #[test]
    fn test_all_nan_group_is_nan_not_fill() {
        let idx = GroupIndex::new(vec![0, 0, 1]);
        let array = NumArray::from(vec![f64::NAN, f64::NAN, 1.0]);
        let result = order_reduce(
            &ExactStats,
            &idx,
            &array,
            OrderStat::Median,
            NanPolicy::Omit,
            &ReduceOptions::new().fill_value(-1),
        )
        .unwrap();
        assert!(result.get(&[0]).unwrap().is_nan());
        assert_eq!(result.get(&[1]), Some(Scalar::Float(1.0)));
    }
}
