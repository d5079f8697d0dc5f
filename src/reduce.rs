//! Folds, vector-wise reductions and element-wise dispatch.

use log::debug;

use crate::array::Array;
use crate::broadcast::broadcast_shape;
use crate::element::BooleanArray;
use crate::Result;

impl<T: Copy> Array<T> {
    /// Left fold over every element in the array's major order.
    ///
    /// Storage is borrowed per element, so `f` may write through aliases.
    pub fn reduce<A>(&self, init: A, f: impl FnMut(A, T) -> A) -> A {
        self.iter().fold(init, f)
    }

    /// Apply `f` to every vector along `dim`.
    ///
    /// The result has the receiver's shape with `dim` removed; a rank-1
    /// receiver reduces to a rank-0 array.
    pub fn reduce_vectors<U: Copy>(
        &self,
        dim: usize,
        mut f: impl FnMut(&Array<T>) -> U,
    ) -> Result<Array<U>> {
        let count = self.vectors(dim)?;
        let mut data = Vec::with_capacity(count);
        for i in 0..count {
            data.push(f(&self.get_vector(dim, i)?));
        }
        let mut shape = self.shape.to_vec();
        shape.remove(dim);
        Ok(Array::fresh(self.order, &shape, data))
    }

    /// New array of `f` applied to every element.
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Array<U> {
        Array::fresh(self.order, &self.shape, self.iter().map(f).collect())
    }

    /// Replace every element `x` with `f(x)`.
    pub fn map_assign(&self, mut f: impl FnMut(T) -> T) {
        for pos in self.positions() {
            self.storage.set(pos, f(self.storage.get(pos)));
        }
    }

    /// Broadcasting binary operation into a new array of the common shape.
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Array<U>,
        mut op: impl FnMut(T, U) -> V,
    ) -> Result<Array<V>> {
        let shape = broadcast_shape(&[self.shape(), other.shape()])?;
        let a = self.broadcast_to(&shape)?;
        let b = other.broadcast_to(&shape)?;
        let data = a
            .iter_in(self.order)
            .zip(b.iter_in(self.order))
            .map(|(x, y)| op(x, y))
            .collect();
        Ok(Array::fresh(self.order, &shape, data))
    }

    /// Broadcasting binary operation over two arrays of the same element type.
    pub fn combine(&self, other: &Array<T>, op: impl FnMut(T, T) -> T) -> Result<Array<T>> {
        self.zip_map(other, op)
    }

    /// Update the receiver in place with `op(self, other)`, broadcasting
    /// `other` to the receiver's shape.
    pub fn combine_assign(&self, other: &Array<T>, mut op: impl FnMut(T, T) -> T) -> Result<()> {
        let other = if self.shares_storage(other) {
            debug!(
                "combine_assign {:?} with aliasing operand {:?}, copying",
                self.shape, other.shape
            );
            other.copy()
        } else {
            other.clone()
        };
        let other = other.broadcast_to(&self.shape)?;
        for (dst, src) in self.positions().zip(other.positions_in(self.order)) {
            let v = op(self.storage.get(dst), other.storage.get(src));
            self.storage.set(dst, v);
        }
        Ok(())
    }

    /// 1-D array of the elements satisfying `pred`, in major order.
    pub fn filter(&self, mut pred: impl FnMut(T) -> bool) -> Array<T> {
        let data: Vec<T> = self.iter().filter(|&x| pred(x)).collect();
        Array::fresh(self.order, &[data.len()], data)
    }

    /// Boolean array of the receiver's shape holding `pred` of every element.
    pub fn mask(&self, pred: impl FnMut(T) -> bool) -> BooleanArray {
        self.map(pred)
    }

    pub fn any(&self, mut pred: impl FnMut(T) -> bool) -> bool {
        self.iter().any(|x| pred(x))
    }

    pub fn all(&self, mut pred: impl FnMut(T) -> bool) -> bool {
        self.iter().all(|x| pred(x))
    }
}
