//! The dense strided array and its zero-copy view operations.
//!
//! An [`Array`] is a descriptor (shape, stride, offset, major order) over a
//! shared [`Storage`]. Every view operation builds a new descriptor over the
//! same storage and validates it so that every reachable coordinate maps to a
//! valid storage position.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::index::StridedRange;
use crate::storage::Storage;
use crate::stride::{
    compute_stride, flat_index, is_canonical, linear_index, major_stride_dim, reverse,
    shape_size, unravel_index, MajorOrder,
};
use crate::{ArrayError, Result};

/// Validate that all accessible offsets of a strided layout are within bounds.
fn validate_bounds(len: usize, shape: &[usize], stride: &[isize], offset: isize) -> Result<()> {
    if shape.len() != stride.len() {
        return Err(ArrayError::StrideLengthMismatch);
    }
    // Empty array - no access needed
    if shape.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &s) in shape.iter().zip(stride.iter()) {
        if dim > 1 {
            let end = s
                .checked_mul(dim as isize - 1)
                .ok_or(ArrayError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(ArrayError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(ArrayError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 {
        return Err(ArrayError::OffsetOverflow);
    }
    if max_offset as usize >= len {
        return Err(ArrayError::OffsetOverflow);
    }
    Ok(())
}

/// Number of elements selected by a strided range.
pub(crate) fn compute_slice_len(start: usize, end: usize, step: isize) -> usize {
    if step > 0 {
        end.saturating_sub(start).div_ceil(step as usize)
    } else {
        start.saturating_sub(end).div_ceil(step.unsigned_abs())
    }
}

/// Dense N-dimensional array, possibly a view over another array's storage.
///
/// `Clone` produces another alias of the same storage. Use [`Array::copy`]
/// for an independent deep copy.
pub struct Array<T> {
    pub(crate) storage: Storage<T>,
    pub(crate) shape: Rc<[usize]>,
    pub(crate) stride: Rc<[isize]>,
    pub(crate) offset: usize,
    pub(crate) size: usize,
    pub(crate) order: MajorOrder,
    pub(crate) major_stride_dim: usize,
    pub(crate) contiguous: bool,
    pub(crate) view: bool,
}

impl<T> Clone for Array<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shape: Rc::clone(&self.shape),
            stride: Rc::clone(&self.stride),
            offset: self.offset,
            size: self.size,
            order: self.order,
            major_stride_dim: self.major_stride_dim,
            contiguous: self.contiguous,
            view: true,
        }
    }
}

impl<T: Copy> Array<T> {
    fn build(
        storage: Storage<T>,
        shape: Vec<usize>,
        stride: Vec<isize>,
        offset: isize,
        order: MajorOrder,
        view: bool,
    ) -> Result<Self> {
        let size = shape_size(&shape);
        // an empty view never dereferences its offset
        let offset = if size == 0 { offset.max(0) } else { offset };
        validate_bounds(storage.len(), &shape, &stride, offset)?;
        let offset = offset as usize;
        let contiguous = offset == 0 && storage.len() == size && is_canonical(&shape, &stride, order);
        let major_stride_dim = if shape.is_empty() {
            0
        } else {
            major_stride_dim(&shape, &stride, order)
        };
        Ok(Self {
            storage,
            shape: shape.into(),
            stride: stride.into(),
            offset,
            size,
            order,
            major_stride_dim,
            contiguous,
            view,
        })
    }

    /// Create an array of `shape` over `data` laid out canonically in `order`.
    ///
    /// # Errors
    /// `SizeMismatch` if `data.len()` differs from the product of `shape`.
    pub fn from_vec(order: MajorOrder, shape: &[usize], data: Vec<T>) -> Result<Self> {
        let size = shape_size(shape);
        if data.len() != size {
            return Err(ArrayError::SizeMismatch {
                expected: size,
                found: data.len(),
            });
        }
        let stride = compute_stride(order, shape);
        Self::build(
            Storage::from_vec(data),
            shape.to_vec(),
            stride,
            0,
            order,
            false,
        )
    }

    /// Fresh canonical array over `data`, whose length must equal the product
    /// of `shape`.
    pub(crate) fn fresh(order: MajorOrder, shape: &[usize], data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), shape_size(shape));
        let stride = compute_stride(order, shape);
        let major_stride_dim = if shape.is_empty() {
            0
        } else {
            major_stride_dim(shape, &stride, order)
        };
        Self {
            size: data.len(),
            storage: Storage::from_vec(data),
            shape: shape.into(),
            stride: stride.into(),
            offset: 0,
            order,
            major_stride_dim,
            contiguous: true,
            view: false,
        }
    }

    /// Create an array of `shape` with every element set to `value`.
    pub fn from_elem(order: MajorOrder, shape: &[usize], value: T) -> Self {
        Self::fresh(order, shape, vec![value; shape_size(shape)])
    }

    /// Rank-0 array holding a single value.
    pub fn scalar(value: T) -> Self {
        Self::from_elem(MajorOrder::default(), &[], value)
    }

    /// Build a view with an explicit layout over existing storage.
    ///
    /// # Errors
    /// `StrideLengthMismatch` if `shape` and `stride` differ in length and
    /// `OffsetOverflow` if any coordinate would fall outside `storage`.
    pub fn from_storage(
        storage: Storage<T>,
        shape: &[usize],
        stride: &[isize],
        offset: usize,
        order: MajorOrder,
    ) -> Result<Self> {
        Self::build(
            storage,
            shape.to_vec(),
            stride.to_vec(),
            offset as isize,
            order,
            true,
        )
    }

    /// A new descriptor over this array's storage.
    pub(crate) fn derive(&self, offset: isize, shape: Vec<usize>, stride: Vec<isize>) -> Result<Self> {
        Self::build(self.storage.clone(), shape, stride, offset, self.order, true)
    }

    // ------------------------------------------------------------------
    // Descriptor accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn stride(&self) -> &[isize] {
        &self.stride
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn order(&self) -> MajorOrder {
        self.order
    }

    /// The dimension with the smallest non-zero stride magnitude.
    #[inline]
    pub fn major_stride_dim(&self) -> usize {
        self.major_stride_dim
    }

    /// Handle on the backing storage.
    #[inline]
    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    /// Offset 0, no gaps, canonical strides for the array's order.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    /// Whether this array was derived from storage owned by another array.
    #[inline]
    pub fn is_view(&self) -> bool {
        self.view
    }

    /// Rank 1, or rank 2 with a single row or column.
    pub fn is_vector(&self) -> bool {
        match self.shape.len() {
            1 => true,
            2 => self.shape[0] == 1 || self.shape[1] == 1,
            _ => false,
        }
    }

    #[inline]
    pub fn is_matrix(&self) -> bool {
        self.shape.len() == 2
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Whether both arrays alias the same backing storage.
    #[inline]
    pub fn shares_storage(&self, other: &Array<T>) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    /// Element at `coords`.
    pub fn get(&self, coords: &[usize]) -> Result<T> {
        let pos = linear_index(coords, &self.shape, &self.stride, self.offset)?;
        Ok(self.storage.get(pos))
    }

    pub fn set(&self, coords: &[usize], value: T) -> Result<()> {
        let pos = linear_index(coords, &self.shape, &self.stride, self.offset)?;
        self.storage.set(pos, value);
        Ok(())
    }

    /// Element at flat index `index`, counted in the array's major order.
    pub fn get_flat(&self, index: usize) -> Result<T> {
        let pos = self.flat_position(index)?;
        Ok(self.storage.get(pos))
    }

    pub fn set_flat(&self, index: usize, value: T) -> Result<()> {
        let pos = self.flat_position(index)?;
        self.storage.set(pos, value);
        Ok(())
    }

    fn flat_position(&self, index: usize) -> Result<usize> {
        if self.contiguous {
            if index >= self.size {
                return Err(ArrayError::FlatIndexOutOfBounds {
                    index,
                    size: self.size,
                });
            }
            return Ok(index);
        }
        flat_index(index, &self.shape, &self.stride, self.offset, self.order)
    }

    /// Storage positions of every element, in the array's major order.
    pub(crate) fn positions(&self) -> Positions {
        self.positions_in(self.order)
    }

    /// Storage positions of every element, visited in `order`.
    pub(crate) fn positions_in(&self, order: MajorOrder) -> Positions {
        Positions::new(
            Rc::clone(&self.shape),
            Rc::clone(&self.stride),
            self.offset,
            order,
        )
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: T) {
        if self.contiguous {
            self.storage.with_slice_mut(|d| d.fill(value));
            return;
        }
        for pos in self.positions() {
            self.storage.set(pos, value);
        }
    }

    /// Iterate the elements by value in the array's major order.
    pub fn iter(&self) -> Iter<T> {
        self.iter_in(self.order)
    }

    /// Iterate the elements by value in `order`.
    pub fn iter_in(&self, order: MajorOrder) -> Iter<T> {
        Iter {
            storage: self.storage.clone(),
            positions: self.positions_in(order),
        }
    }

    /// Elements in the array's major order.
    pub fn to_vec(&self) -> Vec<T> {
        if self.contiguous {
            return self.storage.with_slice(|d| d.to_vec());
        }
        self.iter().collect()
    }

    /// Fresh contiguous deep copy with the same shape and order.
    pub fn copy(&self) -> Self {
        Self::fresh(self.order, &self.shape, self.to_vec())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// View with a new shape of equal size.
    ///
    /// Non-contiguous arrays are copied first; the result then aliases the
    /// copy rather than the receiver.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let found = shape_size(shape);
        if found != self.size {
            return Err(ArrayError::SizeMismatch {
                expected: self.size,
                found,
            });
        }
        if self.contiguous {
            return self.derive(0, shape.to_vec(), compute_stride(self.order, shape));
        }
        debug!(
            "reshape {:?} -> {:?}: non-contiguous source, copying",
            self.shape, shape
        );
        let copy = self.copy();
        copy.derive(0, shape.to_vec(), compute_stride(self.order, shape))
    }

    /// Flatten to one dimension under the same rule as [`Array::reshape`].
    pub fn ravel(&self) -> Result<Self> {
        self.reshape(&[self.size])
    }

    /// View of the `index`-th sub-array along dimension 0.
    pub fn select(&self, index: usize) -> Result<Self> {
        self.select_dim(0, index)
    }

    /// View with dimension `dim` fixed at `index` and dropped.
    pub fn select_dim(&self, dim: usize, index: usize) -> Result<Self> {
        let rank = self.rank();
        if rank < 2 {
            return Err(ArrayError::RankMismatch {
                expected: 2,
                found: rank,
            });
        }
        if dim >= rank {
            return Err(ArrayError::InvalidAxis { axis: dim, rank });
        }
        if index >= self.shape[dim] {
            return Err(ArrayError::IndexOutOfBounds {
                index,
                dim,
                size: self.shape[dim],
            });
        }
        let offset = self.offset as isize + index as isize * self.stride[dim];
        let mut shape = self.shape.to_vec();
        let mut stride = self.stride.to_vec();
        shape.remove(dim);
        stride.remove(dim);
        self.derive(offset, shape, stride)
    }

    /// Reverse the order of the dimensions.
    pub fn transpose(&self) -> Result<Self> {
        if self.rank() <= 1 {
            return self.derive(
                self.offset as isize,
                self.shape.to_vec(),
                self.stride.to_vec(),
            );
        }
        self.derive(
            self.offset as isize,
            reverse(&self.shape),
            reverse(&self.stride),
        )
    }

    /// Reorder the dimensions: dimension `i` of the view is `axes[i]` of the
    /// receiver.
    pub fn permute(&self, axes: &[usize]) -> Result<Self> {
        let rank = self.rank();
        if axes.len() != rank {
            return Err(ArrayError::RankMismatch {
                expected: rank,
                found: axes.len(),
            });
        }
        let mut seen = vec![false; rank];
        for &axis in axes {
            if axis >= rank || seen[axis] {
                return Err(ArrayError::InvalidAxis { axis, rank });
            }
            seen[axis] = true;
        }
        let shape = axes.iter().map(|&a| self.shape[a]).collect();
        let stride = axes.iter().map(|&a| self.stride[a]).collect();
        self.derive(self.offset as isize, shape, stride)
    }

    fn require_matrix(&self) -> Result<()> {
        if self.rank() != 2 {
            return Err(ArrayError::RankMismatch {
                expected: 2,
                found: self.rank(),
            });
        }
        Ok(())
    }

    /// Rectangular 2-D window of `rows x cols` starting at
    /// `(row_offset, col_offset)`.
    pub fn get_view(
        &self,
        row_offset: usize,
        col_offset: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Self> {
        self.require_matrix()?;
        for (dim, (start, len)) in [(row_offset, rows), (col_offset, cols)].into_iter().enumerate() {
            let end = start.checked_add(len).ok_or(ArrayError::OffsetOverflow)?;
            if end > self.shape[dim] {
                return Err(ArrayError::IndexOutOfBounds {
                    index: end,
                    dim,
                    size: self.shape[dim],
                });
            }
        }
        let offset = self.offset as isize
            + row_offset as isize * self.stride[0]
            + col_offset as isize * self.stride[1];
        self.derive(offset, vec![rows, cols], self.stride.to_vec())
    }

    /// Number of vectors along `dim`: the product of every other dimension.
    pub fn vectors(&self, dim: usize) -> Result<usize> {
        let rank = self.rank();
        if dim >= rank {
            return Err(ArrayError::InvalidAxis { axis: dim, rank });
        }
        Ok(self
            .shape
            .iter()
            .enumerate()
            .filter(|&(d, _)| d != dim)
            .map(|(_, &n)| n)
            .product())
    }

    /// 1-D view of the `index`-th vector along `dim`.
    ///
    /// Vectors are enumerated over the remaining dimensions in the array's
    /// major order.
    pub fn get_vector(&self, dim: usize, index: usize) -> Result<Self> {
        let count = self.vectors(dim)?;
        if index >= count {
            return Err(ArrayError::FlatIndexOutOfBounds { index, size: count });
        }
        let mut rest_shape = self.shape.to_vec();
        let mut rest_stride = self.stride.to_vec();
        rest_shape.remove(dim);
        rest_stride.remove(dim);
        let mut coords = vec![0usize; rest_shape.len()];
        unravel_index(index, &rest_shape, self.order, &mut coords)?;
        let offset = coords
            .iter()
            .zip(&rest_stride)
            .fold(self.offset as isize, |acc, (&c, &s)| acc + c as isize * s);
        self.derive(offset, vec![self.shape[dim]], vec![self.stride[dim]])
    }

    /// Assign `values` to the `index`-th vector along `dim`.
    pub fn set_vector(&self, dim: usize, index: usize, values: &Array<T>) -> Result<()> {
        self.get_vector(dim, index)?.assign(values)
    }

    /// Row `i` of a matrix as a `1 x cols` view.
    pub fn get_row(&self, i: usize) -> Result<Self> {
        self.require_matrix()?;
        if i >= self.shape[0] {
            return Err(ArrayError::IndexOutOfBounds {
                index: i,
                dim: 0,
                size: self.shape[0],
            });
        }
        let offset = self.offset as isize + i as isize * self.stride[0];
        self.derive(offset, vec![1, self.shape[1]], self.stride.to_vec())
    }

    /// Column `j` of a matrix as a `rows x 1` view.
    pub fn get_column(&self, j: usize) -> Result<Self> {
        self.require_matrix()?;
        if j >= self.shape[1] {
            return Err(ArrayError::IndexOutOfBounds {
                index: j,
                dim: 1,
                size: self.shape[1],
            });
        }
        let offset = self.offset as isize + j as isize * self.stride[1];
        self.derive(offset, vec![self.shape[0], 1], self.stride.to_vec())
    }

    pub fn set_row(&self, i: usize, values: &Array<T>) -> Result<()> {
        self.get_row(i)?.assign(values)
    }

    pub fn set_column(&self, j: usize, values: &Array<T>) -> Result<()> {
        self.get_column(j)?.assign(values)
    }

    /// Main diagonal of a matrix as a 1-D view.
    pub fn get_diagonal(&self) -> Result<Self> {
        self.require_matrix()?;
        let n = self.shape[0].min(self.shape[1]);
        self.derive(
            self.offset as isize,
            vec![n],
            vec![self.stride[0] + self.stride[1]],
        )
    }

    /// Basic strided slicing of the leading dimensions, one range per
    /// dimension. Trailing dimensions are kept whole.
    pub fn slice(&self, ranges: &[StridedRange]) -> Result<Self> {
        let rank = self.rank();
        if ranges.len() > rank {
            return Err(ArrayError::IndexerCount {
                count: ranges.len(),
                rank,
            });
        }
        let mut shape = self.shape.to_vec();
        let mut stride = self.stride.to_vec();
        let mut offset = self.offset as isize;
        for (dim, range) in ranges.iter().enumerate() {
            let (len, start) = range.resolve(dim, self.shape[dim])?;
            if len > 0 {
                offset += start as isize * self.stride[dim];
            }
            shape[dim] = len;
            // a single element never steps, so its stride is kept as is
            if len > 1 {
                stride[dim] = self.stride[dim]
                    .checked_mul(range.step)
                    .ok_or(ArrayError::OffsetOverflow)?;
            }
        }
        self.derive(offset, shape, stride)
    }

    /// Reverse dimension `dim` without copying.
    pub fn flip(&self, dim: usize) -> Result<Self> {
        let rank = self.rank();
        if dim >= rank {
            return Err(ArrayError::InvalidAxis { axis: dim, rank });
        }
        let n = self.shape[dim];
        let mut stride = self.stride.to_vec();
        let mut offset = self.offset as isize;
        if n > 0 {
            offset += (n as isize - 1) * stride[dim];
        }
        stride[dim] = -stride[dim];
        self.derive(offset, self.shape.to_vec(), stride)
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Copy `other` into the receiver element by element.
    ///
    /// `other` is broadcast to the receiver's shape. Two vectors of equal size
    /// are assigned by flat index regardless of orientation.
    ///
    /// # Errors
    /// `ShapeMismatch` if `other` cannot be broadcast to the receiver's shape.
    pub fn assign(&self, other: &Array<T>) -> Result<()> {
        let source = if self.shares_storage(other) {
            debug!(
                "assign {:?} <- {:?}: source aliases destination, copying",
                self.shape, other.shape
            );
            other.copy()
        } else {
            other.clone()
        };
        let source = if self.shape == source.shape {
            source
        } else if self.is_vector() && source.is_vector() && self.size == source.size {
            return self.assign_flat(&source);
        } else {
            source.broadcast_to(&self.shape)?
        };
        if self.contiguous && source.contiguous && self.order == source.order {
            source
                .storage
                .with_slice(|src| self.storage.with_slice_mut(|dst| dst.copy_from_slice(src)));
            return Ok(());
        }
        for (dst, src) in self.positions().zip(source.positions_in(self.order)) {
            self.storage.set(dst, source.storage.get(src));
        }
        Ok(())
    }

    fn assign_flat(&self, source: &Array<T>) -> Result<()> {
        for (dst, src) in self.positions().zip(source.positions_in(self.order)) {
            self.storage.set(dst, source.storage.get(src));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Traversal
// ----------------------------------------------------------------------

/// Storage positions of a strided layout, visited in a major order.
pub(crate) struct Positions {
    shape: Rc<[usize]>,
    stride: Rc<[isize]>,
    order: MajorOrder,
    coords: Vec<usize>,
    pos: isize,
    remaining: usize,
}

impl Positions {
    pub(crate) fn new(
        shape: Rc<[usize]>,
        stride: Rc<[isize]>,
        offset: usize,
        order: MajorOrder,
    ) -> Self {
        let remaining = shape_size(&shape);
        Self {
            coords: vec![0; shape.len()],
            shape,
            stride,
            order,
            pos: offset as isize,
            remaining,
        }
    }

    fn advance(&mut self) {
        let rank = self.shape.len();
        for k in 0..rank {
            let d = match self.order {
                MajorOrder::RowMajor => rank - 1 - k,
                MajorOrder::ColMajor => k,
            };
            self.coords[d] += 1;
            self.pos += self.stride[d];
            if self.coords[d] < self.shape[d] {
                return;
            }
            self.pos -= self.stride[d] * self.shape[d] as isize;
            self.coords[d] = 0;
        }
    }
}

impl Iterator for Positions {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.pos as usize;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Positions {}

/// Element iterator returned by [`Array::iter`].
pub struct Iter<T> {
    storage: Storage<T>,
    positions: Positions,
}

impl<T: Copy> Iterator for Iter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.positions.next().map(|pos| self.storage.get(pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<T: Copy> ExactSizeIterator for Iter<T> {}

impl<T: Copy> IntoIterator for &Array<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

impl<T: Copy + PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.iter().eq(other.iter_in(self.order))
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("shape", &self.shape)
            .field("stride", &self.stride)
            .field("offset", &self.offset)
            .field("data", &self.to_vec())
            .finish()
    }
}
