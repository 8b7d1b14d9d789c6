//! Lane-parallel engine
//!
//! Every lane along the reduced axis is accumulated independently, with lanes
//! distributed over rayon worker threads via `Zip::par_for_each`. The engine
//! can be pinned to a dedicated thread pool through its [`ParallelConfig`].

use super::kernels::{self, GroupState};
use super::{prepare, Engine};
use crate::array::{reduced_shape, Element, GroupIndex, NumArray, Scalar, Widened};
use crate::errors::{GroupAggError, Result};
use crate::options::{ReduceOptions, ReductionSpec};
use crate::parallel::ParallelConfig;
use crate::statistics::AggFunc;
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};

/// Per-lane parallel engine
#[derive(Debug, Clone, Default)]
pub struct CompiledEngine {
    parallel: ParallelConfig,
}

impl CompiledEngine {
    /// Create an engine running on the pool described by `parallel`
    #[must_use]
    pub const fn new(parallel: ParallelConfig) -> Self {
        Self { parallel }
    }

    #[must_use]
    pub fn parallel_config(&self) -> &ParallelConfig {
        &self.parallel
    }
}

impl Engine for CompiledEngine {
    fn name(&self) -> &'static str {
        "compiled"
    }

    fn reduce(
        &self,
        group_idx: &GroupIndex,
        array: &NumArray,
        func: AggFunc,
        options: &ReduceOptions,
    ) -> Result<NumArray> {
        let (spec, bins) = prepare(self, group_idx, array, func, options)?;
        let widened = array.widen();
        let values = self
            .parallel
            .install(|| match &widened {
                Widened::Int(a) => walk_lanes(a.view(), &bins, func, &spec),
                Widened::Float(a) => walk_lanes(a.view(), &bins, func, &spec),
            })
            .map_err(|e| GroupAggError::EngineError {
                engine: "compiled",
                message: e.to_string(),
            })?;
        Ok(NumArray::assemble(values, spec.fill_value, spec.dtype))
    }
}

fn walk_lanes<A: Element>(
    values: ArrayViewD<'_, A>,
    bins: &[Option<usize>],
    func: AggFunc,
    spec: &ReductionSpec,
) -> ArrayD<Option<Scalar>> {
    let axis = Axis(spec.axis);
    let size = spec.size;
    let mut out = ArrayD::from_elem(reduced_shape(values.shape(), spec.axis, size), None);

    Zip::from(out.lanes_mut(axis))
        .and(values.lanes(axis))
        .par_for_each(|mut out_lane, lane| {
            let mut states = vec![GroupState::<A>::new(func); size];
            for (&value, bin) in lane.iter().zip(bins) {
                if let Some(bin) = *bin {
                    kernels::step(func, &mut states[bin], value);
                }
            }
            for (slot, state) in out_lane.iter_mut().zip(&states) {
                *slot = kernels::finish(func, state);
            }
        });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VectorizedEngine;
    use ndarray::{arr2, Array3};

    #[test]
    fn test_lanes_2d() {
        let idx = GroupIndex::new(vec![0, 1, 0]);
        let array = NumArray::from(arr2(&[[1.0, 2.0, 3.0], [4.0, f64::NAN, 6.0]]).into_dyn());
        let result = CompiledEngine::default()
            .reduce(&idx, &array, AggFunc::NanSum, &ReduceOptions::new().fill_value(-1))
            .unwrap();
        // the all-NaN group [1, 1] is absent for the native NaN-skipping sum
        assert_eq!(result, NumArray::Float64(arr2(&[[4.0, 2.0], [10.0, -1.0]]).into_dyn()));
    }

    #[test]
    fn test_dedicated_pool_matches_vectorized() {
        let data = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| ((i * 7 + j * 3 + k) % 11) as i64);
        let array = NumArray::from(data.into_dyn());
        let idx = GroupIndex::new(vec![2, 0, 2, 1]);
        let options = ReduceOptions::new().axis(-2);
        let engine = CompiledEngine::new(ParallelConfig::with_threads(2));

        for func in AggFunc::ALL {
            let compiled = engine.reduce(&idx, &array, func, &options).unwrap();
            let vectorized = VectorizedEngine.reduce(&idx, &array, func, &options).unwrap();
            assert_eq!(compiled, vectorized, "{func} differs between engines");
        }
    }

    #[test]
    fn test_label_out_of_range() {
        let idx = GroupIndex::new(vec![0, 5]);
        let array = NumArray::from(vec![1.0, 2.0]);
        let result = CompiledEngine::default().reduce(
            &idx,
            &array,
            AggFunc::Sum,
            &ReduceOptions::new().size(2),
        );
        assert!(matches!(result, Err(GroupAggError::ValueError(_))));
    }
}
