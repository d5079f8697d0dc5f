//! Basic and advanced (integer-array) indexing.
//!
//! A list of [`Indexer`]s selects from the leading dimensions of an array.
//! When every indexer is basic (`All` or a strided range) the result is a
//! view. As soon as one indexer is an integer array, the selection follows
//! NumPy's advanced indexing rules and produces a fresh array:
//!
//! - the integer arrays are broadcast to a common shape;
//! - if their positions in the indexer list are adjacent, the broadcast shape
//!   replaces them in place;
//! - otherwise the broadcast shape moves to the front of the result, followed
//!   by the basic dimensions in order.

use std::ops::Range;

use log::trace;

use crate::array::{compute_slice_len, Array};
use crate::broadcast::broadcast_shape;
use crate::element::IndexArray;
use crate::stride::MajorOrder;
use crate::{ArrayError, Result};

/// Range `start..end` traversed with `step`.
///
/// A negative step walks down from `start` to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedRange {
    pub start: usize,
    pub end: usize,
    pub step: isize,
}

impl StridedRange {
    pub fn new(start: usize, end: usize, step: isize) -> Self {
        Self { start, end, step }
    }

    /// The full extent of a dimension of `size`.
    pub fn full(size: usize) -> Self {
        Self::new(0, size, 1)
    }

    /// Number of selected elements and the first selected coordinate, checked
    /// against dimension `dim` of `size`.
    pub(crate) fn resolve(&self, dim: usize, size: usize) -> Result<(usize, usize)> {
        if self.step == 0 {
            return Err(ArrayError::InvalidStep);
        }
        let len = compute_slice_len(self.start, self.end, self.step);
        if len == 0 {
            return Ok((0, self.start));
        }
        if self.step > 0 && self.end > size {
            return Err(ArrayError::IndexOutOfBounds {
                index: self.end,
                dim,
                size,
            });
        }
        if self.step < 0 && self.start >= size {
            return Err(ArrayError::IndexOutOfBounds {
                index: self.start,
                dim,
                size,
            });
        }
        Ok((len, self.start))
    }
}

impl From<Range<usize>> for StridedRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end, 1)
    }
}

/// Selection along one dimension.
#[derive(Debug, Clone)]
pub enum Indexer {
    /// The whole dimension.
    All,
    /// A strided range of the dimension.
    Range(StridedRange),
    /// An integer array of coordinates (advanced indexing).
    Array(IndexArray),
}

impl Indexer {
    #[inline]
    pub fn is_advanced(&self) -> bool {
        matches!(self, Indexer::Array(_))
    }
}

impl From<StridedRange> for Indexer {
    fn from(r: StridedRange) -> Self {
        Indexer::Range(r)
    }
}

impl From<Range<usize>> for Indexer {
    fn from(r: Range<usize>) -> Self {
        Indexer::Range(r.into())
    }
}

impl From<IndexArray> for Indexer {
    fn from(a: IndexArray) -> Self {
        Indexer::Array(a)
    }
}

/// Resolved advanced selection: the output shape plus, for every source
/// dimension, an index array viewed at the output shape.
#[derive(Debug)]
pub struct AdvancedIndexer {
    shape: Vec<usize>,
    indexes: Vec<IndexArray>,
}

impl AdvancedIndexer {
    /// Resolve `indexers` against an array of `source_shape`.
    ///
    /// Missing trailing indexers select whole dimensions.
    pub fn new(source_shape: &[usize], indexers: &[Indexer]) -> Result<Self> {
        let rank = source_shape.len();
        check_count(indexers.len(), rank)?;

        let advanced: Vec<usize> = indexers
            .iter()
            .enumerate()
            .filter(|(_, ix)| ix.is_advanced())
            .map(|(i, _)| i)
            .collect();
        let adv_shapes: Vec<&[usize]> = indexers
            .iter()
            .filter_map(|ix| match ix {
                Indexer::Array(a) => Some(a.shape()),
                _ => None,
            })
            .collect();
        let adv_shape = broadcast_shape(&adv_shapes)?;
        let adjacent = match (advanced.first(), advanced.last()) {
            (Some(&first), Some(&last)) => last - first + 1 == advanced.len(),
            _ => true,
        };

        // coordinates selected by each basic dimension
        let mut basic: Vec<Option<IndexArray>> = Vec::with_capacity(rank);
        for (dim, &size) in source_shape.iter().enumerate() {
            let coords: Vec<usize> = match indexers.get(dim) {
                None | Some(Indexer::All) => (0..size).collect(),
                Some(Indexer::Range(r)) => {
                    let (len, start) = r.resolve(dim, size)?;
                    (0..len)
                        .map(|k| (start as isize + k as isize * r.step) as usize)
                        .collect()
                }
                Some(Indexer::Array(_)) => {
                    basic.push(None);
                    continue;
                }
            };
            let len = coords.len();
            basic.push(Some(Array::from_vec(MajorOrder::RowMajor, &[len], coords)?));
        }

        // output layout: where each basic dimension and the advanced block land
        let mut shape = Vec::new();
        let mut basic_axis = vec![0usize; rank];
        let mut adv_axis = 0;
        if !adjacent {
            shape.extend_from_slice(&adv_shape);
        }
        for (dim, coords) in basic.iter().enumerate() {
            match coords {
                Some(c) => {
                    basic_axis[dim] = shape.len();
                    shape.push(c.size());
                }
                None if adjacent && advanced.first() == Some(&dim) => {
                    adv_axis = shape.len();
                    shape.extend_from_slice(&adv_shape);
                }
                None => {}
            }
        }
        trace!(
            "advanced indexing {:?}: adjacent={} output {:?}",
            source_shape,
            adjacent,
            shape
        );

        let mut indexes = Vec::with_capacity(rank);
        for (dim, coords) in basic.into_iter().enumerate() {
            let view = match (coords, indexers.get(dim)) {
                (None, Some(Indexer::Array(a))) => {
                    a.broadcast_to(&adv_shape)?.embed_axes(&shape, adv_axis)?
                }
                (Some(c), _) => c.embed_axes(&shape, basic_axis[dim])?,
                (None, _) => return Err(ArrayError::IndexerCount {
                    count: indexers.len(),
                    rank,
                }),
            };
            indexes.push(view);
        }
        Ok(Self { shape, indexes })
    }

    /// Shape of the selection.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Storage positions of `source` for every output element, in `order`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` for the first coordinate outside its dimension.
    pub fn offsets<T: Copy>(&self, source: &Array<T>, order: MajorOrder) -> Result<Vec<usize>> {
        let mut iters: Vec<_> = self.indexes.iter().map(|ix| ix.iter_in(order)).collect();
        let size = self.shape.iter().product();
        let mut out = Vec::with_capacity(size);
        for _ in 0..size {
            let mut pos = source.offset() as isize;
            for (dim, it) in iters.iter_mut().enumerate() {
                let c = it.next().unwrap_or(0);
                if c >= source.shape()[dim] {
                    return Err(ArrayError::IndexOutOfBounds {
                        index: c,
                        dim,
                        size: source.shape()[dim],
                    });
                }
                pos += c as isize * source.stride()[dim];
            }
            out.push(pos as usize);
        }
        Ok(out)
    }
}

fn check_count(count: usize, rank: usize) -> Result<()> {
    if count == 0 || count > rank {
        return Err(ArrayError::IndexerCount { count, rank });
    }
    Ok(())
}

impl<T: Copy> Array<T> {
    /// Select with a list of indexers.
    ///
    /// All-basic selections return a view; selections with an integer array
    /// return a fresh array.
    pub fn get_indexed(&self, indexers: &[Indexer]) -> Result<Array<T>> {
        check_count(indexers.len(), self.rank())?;
        if let Some(ranges) = self.basic_ranges(indexers) {
            return self.slice(&ranges);
        }
        let indexer = AdvancedIndexer::new(&self.shape, indexers)?;
        let data = indexer
            .offsets(self, self.order)?
            .into_iter()
            .map(|pos| self.storage.get(pos))
            .collect();
        Array::from_vec(self.order, indexer.shape(), data)
    }

    /// Assign `values` (broadcast to the selection's shape) to the selected
    /// elements.
    ///
    /// Every index is validated before the first write.
    pub fn set_indexed(&self, indexers: &[Indexer], values: &Array<T>) -> Result<()> {
        check_count(indexers.len(), self.rank())?;
        if let Some(ranges) = self.basic_ranges(indexers) {
            return self.slice(&ranges)?.assign(values);
        }
        let indexer = AdvancedIndexer::new(&self.shape, indexers)?;
        let offsets = indexer.offsets(self, self.order)?;
        let values = if values.shares_storage(self) {
            values.copy()
        } else {
            values.clone()
        };
        let source = values.broadcast_to(indexer.shape())?;
        for (dst, v) in offsets.into_iter().zip(source.iter_in(self.order)) {
            self.storage.set(dst, v);
        }
        Ok(())
    }

    fn basic_ranges(&self, indexers: &[Indexer]) -> Option<Vec<StridedRange>> {
        indexers
            .iter()
            .zip(self.shape.iter())
            .map(|(ix, &size)| match ix {
                Indexer::All => Some(StridedRange::full(size)),
                Indexer::Range(r) => Some(*r),
                Indexer::Array(_) => None,
            })
            .collect()
    }
}
