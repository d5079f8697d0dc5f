//! Array construction and linear-algebra entry points.
//!
//! [`ArrayFactory`] is the configuration object of the crate: it fixes the
//! [`MajorOrder`] of every array it creates and owns the [`ArrayRoutines`]
//! provider the linear-algebra operations delegate to.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::array::Array;
use crate::element::{DoubleArray, Scalar};
use crate::routines::{ArrayOperation, ArrayRoutines, StridedRoutines};
use crate::stride::{next_coords, shape_size, MajorOrder};
use crate::{ArrayError, Result};

/// Creates arrays in a fixed major order and runs linear algebra through an
/// injected [`ArrayRoutines`].
#[derive(Clone)]
pub struct ArrayFactory {
    order: MajorOrder,
    routines: Rc<dyn ArrayRoutines>,
}

impl Default for ArrayFactory {
    /// Row-major arrays and [`StridedRoutines`].
    fn default() -> Self {
        Self {
            order: MajorOrder::RowMajor,
            routines: Rc::new(StridedRoutines),
        }
    }
}

impl fmt::Debug for ArrayFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayFactory")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ArrayFactory`].
#[derive(Default)]
pub struct ArrayFactoryBuilder {
    order: Option<MajorOrder>,
    routines: Option<Rc<dyn ArrayRoutines>>,
}

impl ArrayFactoryBuilder {
    pub fn order(mut self, order: MajorOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn routines(mut self, routines: Rc<dyn ArrayRoutines>) -> Self {
        self.routines = Some(routines);
        self
    }

    pub fn build(self) -> ArrayFactory {
        let order = self.order.unwrap_or_default();
        debug!("array factory: {:?}", order);
        ArrayFactory {
            order,
            routines: self
                .routines
                .unwrap_or_else(|| Rc::new(StridedRoutines)),
        }
    }
}

impl ArrayFactory {
    pub fn builder() -> ArrayFactoryBuilder {
        ArrayFactoryBuilder::default()
    }

    #[inline]
    pub fn order(&self) -> MajorOrder {
        self.order
    }

    #[inline]
    pub fn routines(&self) -> &dyn ArrayRoutines {
        self.routines.as_ref()
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// 1-D array over `data`.
    pub fn array<T: Copy>(&self, data: Vec<T>) -> Array<T> {
        let n = data.len();
        Array::fresh(self.order, &[n], data)
    }

    /// Array of `shape` over `data`, interpreted in the factory's order.
    pub fn from_vec<T: Copy>(&self, shape: &[usize], data: Vec<T>) -> Result<Array<T>> {
        Array::from_vec(self.order, shape, data)
    }

    pub fn zeros<T: Scalar>(&self, shape: &[usize]) -> Array<T> {
        Array::from_elem(self.order, shape, T::zero())
    }

    pub fn ones<T: Scalar>(&self, shape: &[usize]) -> Array<T> {
        Array::from_elem(self.order, shape, T::one())
    }

    pub fn full<T: Copy>(&self, shape: &[usize], value: T) -> Array<T> {
        Array::from_elem(self.order, shape, value)
    }

    pub fn scalar<T: Copy>(&self, value: T) -> Array<T> {
        Array::fresh(self.order, &[], vec![value])
    }

    /// Array of `shape` with `f(coords)` at every coordinate.
    pub fn from_fn<T: Copy>(&self, shape: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Array<T> {
        let size = shape_size(shape);
        let mut data = Vec::with_capacity(size);
        if size > 0 {
            let mut coords = vec![0usize; shape.len()];
            loop {
                data.push(f(&coords));
                if !next_coords(&mut coords, shape, self.order) {
                    break;
                }
            }
        }
        Array::fresh(self.order, shape, data)
    }

    /// `start, start + step, ...` up to but excluding `end`.
    ///
    /// # Errors
    /// `InvalidStep` if `step` is zero.
    pub fn range<T: Scalar + PartialOrd>(&self, start: T, end: T, step: T) -> Result<Array<T>> {
        if step == T::zero() {
            return Err(ArrayError::InvalidStep);
        }
        let ascending = step > T::zero();
        let mut data = Vec::new();
        let mut v = start;
        while (ascending && v < end) || (!ascending && v > end) {
            data.push(v);
            v = v + step;
        }
        Ok(self.array(data))
    }

    /// `n` evenly spaced values from `start` to `end` inclusive.
    pub fn linspace(&self, start: f64, end: f64, n: usize) -> DoubleArray {
        let data = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (n - 1) as f64;
                (0..n).map(|i| start + i as f64 * step).collect()
            }
        };
        self.array(data)
    }

    /// `n x n` identity matrix.
    pub fn eye<T: Scalar>(&self, n: usize) -> Array<T> {
        let mut data = vec![T::zero(); n * n];
        for i in 0..n {
            data[i * n + i] = T::one();
        }
        Array::fresh(self.order, &[n, n], data)
    }

    // ------------------------------------------------------------------
    // Linear algebra
    // ------------------------------------------------------------------

    pub fn dot(&self, x: &DoubleArray, y: &DoubleArray) -> Result<f64> {
        self.routines.dot(x, y)
    }

    pub fn norm2(&self, x: &DoubleArray) -> Result<f64> {
        self.routines.norm2(x)
    }

    /// Matrix product `a * b` as a new array.
    pub fn mmul(&self, a: &DoubleArray, b: &DoubleArray) -> Result<DoubleArray> {
        self.mmul_op(ArrayOperation::Keep, a, ArrayOperation::Keep, b)
    }

    /// Matrix product `op_a(a) * op_b(b)` as a new array.
    pub fn mmul_op(
        &self,
        trans_a: ArrayOperation,
        a: &DoubleArray,
        trans_b: ArrayOperation,
        b: &DoubleArray,
    ) -> Result<DoubleArray> {
        for m in [a, b] {
            if !m.is_matrix() {
                return Err(ArrayError::RankMismatch {
                    expected: 2,
                    found: m.rank(),
                });
            }
        }
        let rows = if trans_a.is_transpose() { a.shape()[1] } else { a.shape()[0] };
        let cols = if trans_b.is_transpose() { b.shape()[0] } else { b.shape()[1] };
        let c = self.zeros(&[rows, cols]);
        self.routines.gemm(trans_a, trans_b, 1.0, a, b, 0.0, &c)?;
        Ok(c)
    }

    /// `c = alpha * op_a(a) * op_b(b) + beta * c`
    #[allow(clippy::too_many_arguments)]
    pub fn gemm(
        &self,
        trans_a: ArrayOperation,
        trans_b: ArrayOperation,
        alpha: f64,
        a: &DoubleArray,
        b: &DoubleArray,
        beta: f64,
        c: &DoubleArray,
    ) -> Result<()> {
        self.routines.gemm(trans_a, trans_b, alpha, a, b, beta, c)
    }
}
