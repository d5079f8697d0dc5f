//! Shape and stride arithmetic.
//!
//! Pure functions mapping coordinates (or a flat index) to an offset into
//! backing storage, computing canonical strides for a shape, and stepping a
//! coordinate tuple through a shape in a given major order.

use crate::{ArrayError, Result};

/// Order in which a flat traversal visits the coordinates of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MajorOrder {
    /// C order: the last index varies fastest.
    #[default]
    RowMajor,
    /// Fortran order: the first index varies fastest.
    ColMajor,
}

impl MajorOrder {
    /// The dimension that varies fastest for a shape of rank `rank`.
    #[inline]
    pub fn fastest_dim(self, rank: usize) -> usize {
        match self {
            MajorOrder::RowMajor => rank.saturating_sub(1),
            MajorOrder::ColMajor => 0,
        }
    }
}

/// Number of elements addressed by `shape`. The empty shape is a scalar.
#[inline]
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Compute canonical strides for `shape`.
///
/// Iterating the backing buffer linearly visits the elements in `order` with
/// no gaps.
pub fn compute_stride(order: MajorOrder, shape: &[usize]) -> Vec<isize> {
    let rank = shape.len();
    let mut stride = vec![1isize; rank];
    if rank == 0 {
        return stride;
    }
    match order {
        MajorOrder::RowMajor => {
            for i in (0..rank - 1).rev() {
                stride[i] = stride[i + 1] * shape[i + 1].max(1) as isize;
            }
        }
        MajorOrder::ColMajor => {
            for i in 1..rank {
                stride[i] = stride[i - 1] * shape[i - 1].max(1) as isize;
            }
        }
    }
    stride
}

/// Compute `offset + Σ coords[i] * stride[i]`.
///
/// # Errors
/// `RankMismatch` if the coordinate count differs from the rank,
/// `IndexOutOfBounds` if a coordinate is outside its dimension and
/// `OffsetOverflow` if the position is negative or overflows.
pub fn linear_index(
    coords: &[usize],
    shape: &[usize],
    stride: &[isize],
    offset: usize,
) -> Result<usize> {
    if coords.len() != shape.len() {
        return Err(ArrayError::RankMismatch {
            expected: shape.len(),
            found: coords.len(),
        });
    }
    for (dim, (&c, &size)) in coords.iter().zip(shape).enumerate() {
        if c >= size {
            return Err(ArrayError::IndexOutOfBounds {
                index: c,
                dim,
                size,
            });
        }
    }
    offset_of(coords, stride, offset)
}

/// Offset of an in-bounds coordinate tuple.
pub(crate) fn offset_of(coords: &[usize], stride: &[isize], offset: usize) -> Result<usize> {
    if coords.len() != stride.len() {
        return Err(ArrayError::StrideLengthMismatch);
    }
    let mut pos = isize::try_from(offset).map_err(|_| ArrayError::OffsetOverflow)?;
    for (&c, &s) in coords.iter().zip(stride) {
        pos = (c as isize)
            .checked_mul(s)
            .and_then(|step| pos.checked_add(step))
            .ok_or(ArrayError::OffsetOverflow)?;
    }
    usize::try_from(pos).map_err(|_| ArrayError::OffsetOverflow)
}

/// Decompose a flat index into coordinates of `shape` in `order`.
///
/// # Errors
/// `FlatIndexOutOfBounds` if `index >= shape_size(shape)`.
pub fn unravel_index(
    index: usize,
    shape: &[usize],
    order: MajorOrder,
    coords: &mut [usize],
) -> Result<()> {
    let size = shape_size(shape);
    if index >= size {
        return Err(ArrayError::FlatIndexOutOfBounds { index, size });
    }
    debug_assert_eq!(coords.len(), shape.len());
    let mut rest = index;
    match order {
        MajorOrder::RowMajor => {
            for d in (0..shape.len()).rev() {
                coords[d] = rest % shape[d];
                rest /= shape[d];
            }
        }
        MajorOrder::ColMajor => {
            for d in 0..shape.len() {
                coords[d] = rest % shape[d];
                rest /= shape[d];
            }
        }
    }
    Ok(())
}

/// Storage offset of the `index`-th element of a strided layout, visiting
/// coordinates in `order`.
///
/// # Errors
/// `FlatIndexOutOfBounds` if `index >= shape_size(shape)` and
/// `OffsetOverflow` if the position is negative or overflows.
pub fn flat_index(
    index: usize,
    shape: &[usize],
    stride: &[isize],
    offset: usize,
    order: MajorOrder,
) -> Result<usize> {
    let mut coords = vec![0usize; shape.len()];
    unravel_index(index, shape, order, &mut coords)?;
    offset_of(&coords, stride, offset)
}

/// Advance `coords` to the next coordinate of `shape` in `order`.
///
/// Returns `false` once the walk wraps around past the last coordinate.
#[inline]
pub fn next_coords(coords: &mut [usize], shape: &[usize], order: MajorOrder) -> bool {
    let rank = shape.len();
    for k in 0..rank {
        let d = match order {
            MajorOrder::RowMajor => rank - 1 - k,
            MajorOrder::ColMajor => k,
        };
        coords[d] += 1;
        if coords[d] < shape[d] {
            return true;
        }
        coords[d] = 0;
    }
    false
}

/// Reversed copy of a shape or stride.
pub fn reverse<T: Copy>(values: &[T]) -> Vec<T> {
    values.iter().rev().copied().collect()
}

/// Whether `stride` equals the canonical strides of `shape` in `order`.
///
/// Dimensions of size 0 or 1 never move the offset and are ignored.
pub fn is_canonical(shape: &[usize], stride: &[isize], order: MajorOrder) -> bool {
    if shape.len() != stride.len() {
        return false;
    }
    let mut expected = 1isize;
    let mut check = |d: usize| {
        if shape[d] <= 1 {
            return true;
        }
        if stride[d] != expected {
            return false;
        }
        expected = expected.saturating_mul(shape[d] as isize);
        true
    };
    match order {
        MajorOrder::RowMajor => (0..shape.len()).rev().all(&mut check),
        MajorOrder::ColMajor => (0..shape.len()).all(&mut check),
    }
}

/// The dimension with the smallest non-zero stride magnitude.
///
/// Ties (and layouts where every stride is zero) resolve towards the dimension
/// that varies fastest in `order`.
pub fn major_stride_dim(shape: &[usize], stride: &[isize], order: MajorOrder) -> usize {
    let rank = shape.len();
    let preferred = order.fastest_dim(rank);
    let mut best: Option<(usize, usize)> = None;
    let candidates: Vec<usize> = match order {
        MajorOrder::RowMajor => (0..rank).rev().collect(),
        MajorOrder::ColMajor => (0..rank).collect(),
    };
    for d in candidates {
        let s = stride[d].unsigned_abs();
        if s == 0 || shape[d] <= 1 {
            continue;
        }
        match best {
            Some((_, bs)) if bs <= s => {}
            _ => best = Some((d, s)),
        }
    }
    best.map_or(preferred, |(d, _)| d)
}
