//! Bincount-style engine
//!
//! The reduced axis is moved last so that the array reads as `rows x n`. One
//! sequential pass then scatters element `i` into bin `row * size + label`,
//! after which the bins are reshaped and the axis moved back into place.

use super::kernels::{self, GroupState};
use super::{prepare, Engine};
use crate::array::{reduced_shape, Element, GroupIndex, NumArray, Scalar, Widened};
use crate::errors::Result;
use crate::options::{ReduceOptions, ReductionSpec};
use crate::statistics::AggFunc;
use ndarray::{ArrayD, ArrayViewD};

/// Single-pass scatter engine
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorizedEngine;

impl Engine for VectorizedEngine {
    fn name(&self) -> &'static str {
        "vectorized"
    }

    fn reduce(
        &self,
        group_idx: &GroupIndex,
        array: &NumArray,
        func: AggFunc,
        options: &ReduceOptions,
    ) -> Result<NumArray> {
        let (spec, bins) = prepare(self, group_idx, array, func, options)?;
        let values = match array.widen() {
            Widened::Int(a) => scatter(a.view(), &bins, func, &spec)?,
            Widened::Float(a) => scatter(a.view(), &bins, func, &spec)?,
        };
        Ok(NumArray::assemble(values, spec.fill_value, spec.dtype))
    }
}

fn scatter<A: Element>(
    values: ArrayViewD<'_, A>,
    bins: &[Option<usize>],
    func: AggFunc,
    spec: &ReductionSpec,
) -> Result<ArrayD<Option<Scalar>>> {
    let ndim = values.ndim();
    let mut order: Vec<usize> = (0..ndim).filter(|&d| d != spec.axis).collect();
    order.push(spec.axis);

    let out_shape = reduced_shape(values.shape(), spec.axis, spec.size);
    let moved_shape: Vec<usize> = order.iter().map(|&d| out_shape[d]).collect();
    let rows: usize = moved_shape[..ndim - 1].iter().product();

    let moved = values.permuted_axes(order.clone());
    let n = bins.len();
    let mut states = vec![GroupState::<A>::new(func); rows * spec.size];
    for (i, &value) in moved.iter().enumerate() {
        if let Some(bin) = bins[i % n] {
            kernels::step(func, &mut states[(i / n) * spec.size + bin], value);
        }
    }

    let finished: Vec<Option<Scalar>> = states.iter().map(|s| kernels::finish(func, s)).collect();
    let out = ArrayD::from_shape_vec(moved_shape, finished)?;

    let mut restore = vec![0; ndim];
    for (position, &axis) in order.iter().enumerate() {
        restore[axis] = position;
    }
    Ok(out.permuted_axes(restore).as_standard_layout().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array3};

    #[test]
    fn test_scatter_1d() {
        let idx = GroupIndex::new(vec![0, 0, 1, 1, 1]);
        let array = NumArray::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = VectorizedEngine
            .reduce(&idx, &array, AggFunc::Sum, &ReduceOptions::new())
            .unwrap();
        assert_eq!(result, NumArray::Float64(arr1(&[3.0, 12.0]).into_dyn()));
    }

    #[test]
    fn test_scatter_leading_axis() {
        // groups along rows: {row 0, row 2} and {row 1}
        let idx = GroupIndex::new(vec![0, 1, 0]);
        let array = NumArray::from(arr2(&[[1i64, 2], [3, 4], [5, 6]]).into_dyn());
        let result = VectorizedEngine
            .reduce(&idx, &array, AggFunc::Sum, &ReduceOptions::new().axis(0))
            .unwrap();
        assert_eq!(result, NumArray::Int64(arr2(&[[6, 8], [3, 4]]).into_dyn()));
    }

    #[test]
    fn test_scatter_middle_axis_keeps_layout() {
        let data = Array3::from_shape_fn((2, 3, 2), |(i, j, k)| (i * 100 + j * 10 + k) as f64);
        let idx = GroupIndex::new(vec![1, -1, 1]);
        let array = NumArray::from(data.into_dyn());
        let result = VectorizedEngine
            .reduce(&idx, &array, AggFunc::Max, &ReduceOptions::new().axis(1).size(2))
            .unwrap();
        assert_eq!(result.shape(), &[2, 2, 2]);
        assert_eq!(result.get(&[0, 0, 0]), Some(Scalar::Float(0.0)));
        assert_eq!(result.get(&[1, 1, 1]), Some(Scalar::Float(121.0)));
        assert_eq!(result.get(&[0, 1, 0]), Some(Scalar::Float(20.0)));
    }

    #[test]
    fn test_empty_axis() {
        let idx = GroupIndex::new(vec![]);
        let array = NumArray::from(ArrayD::<f64>::zeros(ndarray::IxDyn(&[2, 0])));
        let result = VectorizedEngine
            .reduce(&idx, &array, AggFunc::Sum, &ReduceOptions::new().size(3).fill_value(-1))
            .unwrap();
        assert_eq!(result, NumArray::Float64(arr2(&[[-1.0; 3], [-1.0; 3]]).into_dyn()));
    }
}
