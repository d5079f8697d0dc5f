//! BLAS-style routines over double arrays, injected into [`ArrayFactory`].
//!
//! [`ArrayRoutines`] carries a generic coordinate-walking implementation of
//! every routine in its default methods, correct for any layout.
//! [`NaiveRoutines`] uses only those. [`StridedRoutines`] runs direct loops
//! over the backing slice (offset plus increment) when the operands allow it
//! and defers to the generic path otherwise.
//!
//! [`ArrayFactory`]: crate::ArrayFactory

use log::trace;

use crate::element::DoubleArray;
use crate::stride::MajorOrder;
use crate::{ArrayError, Result};

/// Operation applied to a matrix operand before multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayOperation {
    #[default]
    Keep,
    Transpose,
    /// Conjugate transpose; the same as `Transpose` for real arrays.
    ConjugateTranspose,
}

impl ArrayOperation {
    /// Zero-copy view of `a` with the operation applied.
    pub fn apply(self, a: &DoubleArray) -> Result<DoubleArray> {
        match self {
            ArrayOperation::Keep => Ok(a.clone()),
            ArrayOperation::Transpose | ArrayOperation::ConjugateTranspose => a.transpose(),
        }
    }

    #[inline]
    pub fn is_transpose(self) -> bool {
        !matches!(self, ArrayOperation::Keep)
    }
}

/// Provider of the linear-algebra kernels used by [`crate::ArrayFactory`].
///
/// Implementors override the methods they can accelerate; the defaults are
/// the generic implementations.
pub trait ArrayRoutines {
    /// Inner product of two vectors of equal size.
    fn dot(&self, x: &DoubleArray, y: &DoubleArray) -> Result<f64> {
        generic_dot(x, y)
    }

    /// Euclidean norm of a vector.
    fn norm2(&self, x: &DoubleArray) -> Result<f64> {
        generic_norm2(x)
    }

    /// Sum of absolute values of a vector.
    fn asum(&self, x: &DoubleArray) -> Result<f64> {
        generic_asum(x)
    }

    /// Position of the first element of largest magnitude, `None` when empty.
    fn iamax(&self, x: &DoubleArray) -> Result<Option<usize>> {
        generic_iamax(x)
    }

    /// `x = alpha * x`
    fn scal(&self, alpha: f64, x: &DoubleArray) -> Result<()> {
        generic_scal(alpha, x)
    }

    /// `y = alpha * x + y`
    fn axpy(&self, alpha: f64, x: &DoubleArray, y: &DoubleArray) -> Result<()> {
        generic_axpy(alpha, x, y)
    }

    /// `y = alpha * op(a) * x + beta * y`
    fn gemv(
        &self,
        trans: ArrayOperation,
        alpha: f64,
        a: &DoubleArray,
        x: &DoubleArray,
        beta: f64,
        y: &DoubleArray,
    ) -> Result<()> {
        generic_gemv(trans, alpha, a, x, beta, y)
    }

    /// `c = alpha * op(a) * op(b) + beta * c`
    ///
    /// When `beta` is zero the previous contents of `c` are not read.
    #[allow(clippy::too_many_arguments)]
    fn gemm(
        &self,
        trans_a: ArrayOperation,
        trans_b: ArrayOperation,
        alpha: f64,
        a: &DoubleArray,
        b: &DoubleArray,
        beta: f64,
        c: &DoubleArray,
    ) -> Result<()> {
        generic_gemm(trans_a, trans_b, alpha, a, b, beta, c)
    }
}

/// Routines that only use the generic paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveRoutines;

impl ArrayRoutines for NaiveRoutines {}

// ============================================================================
// Validation
// ============================================================================

fn require_vector(x: &DoubleArray) -> Result<()> {
    if !x.is_vector() {
        return Err(ArrayError::RequiresVector(x.shape().to_vec()));
    }
    Ok(())
}

fn require_matrix(a: &DoubleArray) -> Result<()> {
    if !a.is_matrix() {
        return Err(ArrayError::RankMismatch {
            expected: 2,
            found: a.rank(),
        });
    }
    Ok(())
}

fn require_same_size(x: &DoubleArray, y: &DoubleArray) -> Result<()> {
    if x.size() != y.size() {
        return Err(ArrayError::ShapeMismatch(
            x.shape().to_vec(),
            y.shape().to_vec(),
        ));
    }
    Ok(())
}

fn check_gemv(a: &DoubleArray, x: &DoubleArray, y: &DoubleArray) -> Result<()> {
    require_matrix(a)?;
    require_vector(x)?;
    require_vector(y)?;
    let (m, n) = (a.shape()[0], a.shape()[1]);
    if x.size() != n || y.size() != m {
        return Err(ArrayError::ShapeMismatch(
            a.shape().to_vec(),
            x.shape().to_vec(),
        ));
    }
    Ok(())
}

fn check_gemm(a: &DoubleArray, b: &DoubleArray, c: &DoubleArray) -> Result<()> {
    require_matrix(a)?;
    require_matrix(b)?;
    require_matrix(c)?;
    let (m, k) = (a.shape()[0], a.shape()[1]);
    let (k2, n) = (b.shape()[0], b.shape()[1]);
    if k != k2 {
        return Err(ArrayError::ShapeMismatch(
            a.shape().to_vec(),
            b.shape().to_vec(),
        ));
    }
    if c.shape() != [m, n] {
        return Err(ArrayError::ShapeMismatch(vec![m, n], c.shape().to_vec()));
    }
    Ok(())
}

// ============================================================================
// Generic paths
// ============================================================================

fn generic_dot(x: &DoubleArray, y: &DoubleArray) -> Result<f64> {
    require_vector(x)?;
    require_vector(y)?;
    require_same_size(x, y)?;
    Ok(x.iter().zip(y.iter()).map(|(a, b)| a * b).sum())
}

fn generic_norm2(x: &DoubleArray) -> Result<f64> {
    require_vector(x)?;
    Ok(x.iter().map(|v| v * v).sum::<f64>().sqrt())
}

fn generic_asum(x: &DoubleArray) -> Result<f64> {
    require_vector(x)?;
    Ok(x.iter().map(f64::abs).sum())
}

fn generic_iamax(x: &DoubleArray) -> Result<Option<usize>> {
    require_vector(x)?;
    Ok(first_max_abs(x.iter()))
}

fn first_max_abs(values: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.enumerate() {
        let m = v.abs();
        match best {
            Some((_, bm)) if m <= bm => {}
            _ => best = Some((i, m)),
        }
    }
    best.map(|(i, _)| i)
}

fn generic_scal(alpha: f64, x: &DoubleArray) -> Result<()> {
    require_vector(x)?;
    x.map_assign(|v| alpha * v);
    Ok(())
}

fn generic_axpy(alpha: f64, x: &DoubleArray, y: &DoubleArray) -> Result<()> {
    require_vector(x)?;
    require_vector(y)?;
    require_same_size(x, y)?;
    let xs = x.to_vec();
    let mut it = xs.into_iter();
    y.map_assign(|v| alpha * it.next().unwrap_or(0.0) + v);
    Ok(())
}

fn generic_gemv(
    trans: ArrayOperation,
    alpha: f64,
    a: &DoubleArray,
    x: &DoubleArray,
    beta: f64,
    y: &DoubleArray,
) -> Result<()> {
    let op_a = trans.apply(a)?;
    check_gemv(&op_a, x, y)?;
    let (m, n) = (op_a.shape()[0], op_a.shape()[1]);
    let av: Vec<f64> = op_a.iter_in(MajorOrder::RowMajor).collect();
    let xs = x.to_vec();
    let ys = y.to_vec();
    let out: Vec<f64> = (0..m)
        .map(|i| {
            let s: f64 = (0..n).map(|j| av[i * n + j] * xs[j]).sum();
            if beta == 0.0 {
                alpha * s
            } else {
                alpha * s + beta * ys[i]
            }
        })
        .collect();
    for (pos, v) in y.positions().zip(out) {
        y.storage.set(pos, v);
    }
    Ok(())
}

fn generic_gemm(
    trans_a: ArrayOperation,
    trans_b: ArrayOperation,
    alpha: f64,
    a: &DoubleArray,
    b: &DoubleArray,
    beta: f64,
    c: &DoubleArray,
) -> Result<()> {
    let op_a = trans_a.apply(a)?;
    let op_b = trans_b.apply(b)?;
    check_gemm(&op_a, &op_b, c)?;
    let (m, k) = (op_a.shape()[0], op_a.shape()[1]);
    let n = op_b.shape()[1];
    let av: Vec<f64> = op_a.iter_in(MajorOrder::RowMajor).collect();
    let bv: Vec<f64> = op_b.iter_in(MajorOrder::RowMajor).collect();
    let cv: Vec<f64> = c.iter_in(MajorOrder::RowMajor).collect();
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let s: f64 = (0..k).map(|l| av[i * k + l] * bv[l * n + j]).sum();
            out[i * n + j] = if beta == 0.0 {
                alpha * s
            } else {
                alpha * s + beta * cv[i * n + j]
            };
        }
    }
    for (pos, v) in c.positions_in(MajorOrder::RowMajor).zip(out) {
        c.storage.set(pos, v);
    }
    Ok(())
}

// ============================================================================
// Strided fast paths
// ============================================================================

/// Routines looping directly over the backing storage.
///
/// Vectors are addressed as (offset, increment, length). Matrices are
/// addressed as (offset, row stride, column stride) and must have a unit
/// stride along one dimension. Operands that would be written while another
/// operand aliases them take the generic path.
#[derive(Debug, Clone, Copy, Default)]
pub struct StridedRoutines;

/// Offset, increment and length of a vector.
fn vector_layout(x: &DoubleArray) -> (isize, isize, usize) {
    let inc = x
        .shape()
        .iter()
        .zip(x.stride())
        .find(|(&n, _)| n > 1)
        .map_or(1, |(_, &s)| s);
    (x.offset() as isize, inc, x.size())
}

#[inline]
fn at(data: &[f64], offset: isize, inc: isize, i: usize) -> f64 {
    data[(offset + i as isize * inc) as usize]
}

fn has_unit_stride(a: &DoubleArray) -> bool {
    a.stride().iter().any(|&s| s == 1)
}

impl ArrayRoutines for StridedRoutines {
    fn dot(&self, x: &DoubleArray, y: &DoubleArray) -> Result<f64> {
        require_vector(x)?;
        require_vector(y)?;
        require_same_size(x, y)?;
        trace!("dot: strided path, n={}", x.size());
        let (ox, ix, n) = vector_layout(x);
        let (oy, iy, _) = vector_layout(y);
        Ok(x.storage().with_slice(|xd| {
            y.storage().with_slice(|yd| {
                (0..n)
                    .map(|i| at(xd, ox, ix, i) * at(yd, oy, iy, i))
                    .sum::<f64>()
            })
        }))
    }

    fn norm2(&self, x: &DoubleArray) -> Result<f64> {
        require_vector(x)?;
        trace!("norm2: strided path, n={}", x.size());
        let (ox, ix, n) = vector_layout(x);
        let ss: f64 = x.storage().with_slice(|xd| {
            (0..n)
                .map(|i| {
                    let v = at(xd, ox, ix, i);
                    v * v
                })
                .sum()
        });
        Ok(ss.sqrt())
    }

    fn asum(&self, x: &DoubleArray) -> Result<f64> {
        require_vector(x)?;
        let (ox, ix, n) = vector_layout(x);
        Ok(x
            .storage()
            .with_slice(|xd| (0..n).map(|i| at(xd, ox, ix, i).abs()).sum::<f64>()))
    }

    fn iamax(&self, x: &DoubleArray) -> Result<Option<usize>> {
        require_vector(x)?;
        let (ox, ix, n) = vector_layout(x);
        Ok(x
            .storage()
            .with_slice(|xd| first_max_abs((0..n).map(|i| at(xd, ox, ix, i)))))
    }

    fn scal(&self, alpha: f64, x: &DoubleArray) -> Result<()> {
        require_vector(x)?;
        let (ox, ix, n) = vector_layout(x);
        x.storage().with_slice_mut(|xd| {
            for i in 0..n {
                let p = (ox + i as isize * ix) as usize;
                xd[p] *= alpha;
            }
        });
        Ok(())
    }

    fn axpy(&self, alpha: f64, x: &DoubleArray, y: &DoubleArray) -> Result<()> {
        if x.shares_storage(y) {
            trace!("axpy: operands share storage, generic path");
            return generic_axpy(alpha, x, y);
        }
        require_vector(x)?;
        require_vector(y)?;
        require_same_size(x, y)?;
        trace!("axpy: strided path, n={}", x.size());
        let (ox, ix, n) = vector_layout(x);
        let (oy, iy, _) = vector_layout(y);
        x.storage().with_slice(|xd| {
            y.storage().with_slice_mut(|yd| {
                for i in 0..n {
                    let p = (oy + i as isize * iy) as usize;
                    yd[p] += alpha * at(xd, ox, ix, i);
                }
            })
        });
        Ok(())
    }

    fn gemv(
        &self,
        trans: ArrayOperation,
        alpha: f64,
        a: &DoubleArray,
        x: &DoubleArray,
        beta: f64,
        y: &DoubleArray,
    ) -> Result<()> {
        let op_a = trans.apply(a)?;
        check_gemv(&op_a, x, y)?;
        if !has_unit_stride(&op_a) || y.shares_storage(a) || y.shares_storage(x) {
            trace!("gemv: layout not supported by the strided path, generic path");
            return generic_gemv(trans, alpha, a, x, beta, y);
        }
        trace!("gemv: strided path, {:?}", op_a.shape());
        let (m, n) = (op_a.shape()[0], op_a.shape()[1]);
        let (rs, cs) = (op_a.stride()[0], op_a.stride()[1]);
        let oa = op_a.offset() as isize;
        let (ox, ix, _) = vector_layout(x);
        let (oy, iy, _) = vector_layout(y);
        op_a.storage().with_slice(|ad| {
            x.storage().with_slice(|xd| {
                y.storage().with_slice_mut(|yd| {
                    for i in 0..m {
                        let row = oa + i as isize * rs;
                        let s: f64 = (0..n)
                            .map(|j| at(ad, row, cs, j) * at(xd, ox, ix, j))
                            .sum();
                        let p = (oy + i as isize * iy) as usize;
                        yd[p] = if beta == 0.0 {
                            alpha * s
                        } else {
                            alpha * s + beta * yd[p]
                        };
                    }
                })
            })
        });
        Ok(())
    }

    fn gemm(
        &self,
        trans_a: ArrayOperation,
        trans_b: ArrayOperation,
        alpha: f64,
        a: &DoubleArray,
        b: &DoubleArray,
        beta: f64,
        c: &DoubleArray,
    ) -> Result<()> {
        let op_a = trans_a.apply(a)?;
        let op_b = trans_b.apply(b)?;
        check_gemm(&op_a, &op_b, c)?;
        let unit = has_unit_stride(&op_a) && has_unit_stride(&op_b) && has_unit_stride(c);
        if !unit || c.shares_storage(a) || c.shares_storage(b) {
            trace!("gemm: layout not supported by the strided path, generic path");
            return generic_gemm(trans_a, trans_b, alpha, a, b, beta, c);
        }
        let (m, k) = (op_a.shape()[0], op_a.shape()[1]);
        let n = op_b.shape()[1];
        trace!("gemm: strided path, m={} n={} k={}", m, n, k);
        let (ars, acs, oa) = (op_a.stride()[0], op_a.stride()[1], op_a.offset() as isize);
        let (brs, bcs, ob) = (op_b.stride()[0], op_b.stride()[1], op_b.offset() as isize);
        let (crs, ccs, oc) = (c.stride()[0], c.stride()[1], c.offset() as isize);
        op_a.storage().with_slice(|ad| {
            op_b.storage().with_slice(|bd| {
                c.storage().with_slice_mut(|cd| {
                    for i in 0..m {
                        let arow = oa + i as isize * ars;
                        for j in 0..n {
                            let bcol = ob + j as isize * bcs;
                            let s: f64 = (0..k)
                                .map(|l| at(ad, arow, acs, l) * at(bd, bcol, brs, l))
                                .sum();
                            let p = (oc + i as isize * crs + j as isize * ccs) as usize;
                            cd[p] = if beta == 0.0 {
                                alpha * s
                            } else {
                                alpha * s + beta * cd[p]
                            };
                        }
                    }
                })
            })
        });
        Ok(())
    }
}
