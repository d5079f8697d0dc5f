//! Gather and scatter by lists of integer index arrays.
//!
//! `k` index arrays address the leading `k` dimensions. They are broadcast to
//! a common shape `B`, and the result has shape `B` followed by the untouched
//! trailing dimensions.

use std::rc::Rc;

use crate::array::{Array, Positions};
use crate::broadcast::broadcast_shape;
use crate::element::IndexArray;
use crate::{ArrayError, Result};

impl<T: Copy> Array<T> {
    /// Gather the sub-arrays addressed by `indexers`.
    ///
    /// When there is one index array per dimension each position is a single
    /// element; otherwise every position copies a whole trailing sub-array.
    pub fn get_slice(&self, indexers: &[IndexArray]) -> Result<Array<T>> {
        let (lead_shape, offsets) = self.leading_offsets(indexers)?;
        let k = indexers.len();
        if k == self.rank() {
            let data = offsets.iter().map(|&pos| self.storage.get(pos)).collect();
            return Array::from_vec(self.order, &lead_shape, data);
        }

        let rest_shape = self.shape[k..].to_vec();
        let rest_stride = self.stride[k..].to_vec();
        let mut out_shape = lead_shape.clone();
        out_shape.extend_from_slice(&rest_shape);
        if out_shape.iter().any(|&n| n == 0) {
            return Array::from_vec(self.order, &out_shape, Vec::new());
        }
        let out = Array::from_elem(self.order, &out_shape, self.storage.get(self.offset));
        // output axes: the broadcast indexer shape, then the trailing dims
        let lead = lead_shape.len();
        let out_rest_stride = out.stride[lead..].to_vec();
        let targets = Positions::new(
            lead_shape.into(),
            Rc::from(&out.stride[..lead]),
            0,
            self.order,
        );
        for (src, dst) in offsets.into_iter().zip(targets) {
            let from = self.derive(src as isize, rest_shape.clone(), rest_stride.clone())?;
            let to = out.derive(dst as isize, rest_shape.clone(), out_rest_stride.clone())?;
            to.assign(&from)?;
        }
        Ok(out)
    }

    /// Scatter `values` into the sub-arrays addressed by `indexers`.
    ///
    /// `values` is broadcast to the shape [`Array::get_slice`] would return.
    /// Every index is validated before the first write.
    pub fn set_slice(&self, indexers: &[IndexArray], values: &Array<T>) -> Result<()> {
        let (lead_shape, offsets) = self.leading_offsets(indexers)?;
        let k = indexers.len();
        let mut out_shape = lead_shape.clone();
        out_shape.extend_from_slice(&self.shape[k..]);

        let values = if values.shares_storage(self) {
            values.copy()
        } else {
            values.clone()
        };
        let values = values.broadcast_to(&out_shape)?;

        if k == self.rank() {
            for (dst, v) in offsets.into_iter().zip(values.iter_in(self.order)) {
                self.storage.set(dst, v);
            }
            return Ok(());
        }

        let rest_shape = self.shape[k..].to_vec();
        let rest_stride = self.stride[k..].to_vec();
        let lead = lead_shape.len();
        let value_rest_stride = values.stride[lead..].to_vec();
        let sources = Positions::new(
            lead_shape.into(),
            Rc::from(&values.stride[..lead]),
            values.offset,
            self.order,
        );
        for (dst, src) in offsets.into_iter().zip(sources) {
            let to = self.derive(dst as isize, rest_shape.clone(), rest_stride.clone())?;
            let from = values.derive(src as isize, rest_shape.clone(), value_rest_stride.clone())?;
            to.assign(&from)?;
        }
        Ok(())
    }

    /// Broadcast shape of `indexers` and the validated storage offset of the
    /// leading sub-array at every position of it, in the array's order.
    fn leading_offsets(&self, indexers: &[IndexArray]) -> Result<(Vec<usize>, Vec<usize>)> {
        let rank = self.rank();
        let k = indexers.len();
        if k == 0 || k > rank {
            return Err(ArrayError::IndexerCount { count: k, rank });
        }
        let shapes: Vec<&[usize]> = indexers.iter().map(|ix| ix.shape()).collect();
        let lead_shape = broadcast_shape(&shapes)?;
        let mut iters = Vec::with_capacity(k);
        for ix in indexers {
            iters.push(ix.broadcast_to(&lead_shape)?.iter_in(self.order));
        }
        let count: usize = lead_shape.iter().product();
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let mut pos = self.offset as isize;
            for (dim, it) in iters.iter_mut().enumerate() {
                let c = it.next().unwrap_or(0);
                if c >= self.shape[dim] {
                    return Err(ArrayError::IndexOutOfBounds {
                        index: c,
                        dim,
                        size: self.shape[dim],
                    });
                }
                pos += c as isize * self.stride[dim];
            }
            offsets.push(pos as usize);
        }
        Ok((lead_shape, offsets))
    }
}
