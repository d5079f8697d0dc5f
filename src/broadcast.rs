//! NumPy-style broadcasting: shape promotion and stride-0 views.

use crate::array::Array;
use crate::{ArrayError, Result};

/// Compute the common broadcast shape of `shapes`.
///
/// Shapes are right-aligned. Each output dimension is the maximum over the
/// inputs, and every input dimension must be 1 or equal to it.
///
/// # Errors
/// `ShapeMismatch` with the shape accumulated so far and the first input
/// that does not fit it.
pub fn broadcast_shape(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let rank = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut result = vec![1usize; rank];
    for shape in shapes {
        let lead = rank - shape.len();
        for (i, &n) in shape.iter().enumerate() {
            let r = result[lead + i];
            if r == n || n == 1 {
                continue;
            }
            if r != 1 {
                return Err(ArrayError::ShapeMismatch(result, shape.to_vec()));
            }
            result[lead + i] = n;
        }
    }
    Ok(result)
}

/// View every array at their common broadcast shape.
pub fn broadcast_arrays<T: Copy>(arrays: &[&Array<T>]) -> Result<Vec<Array<T>>> {
    let shapes: Vec<&[usize]> = arrays.iter().map(|a| a.shape()).collect();
    let target = broadcast_shape(&shapes)?;
    arrays.iter().map(|a| a.broadcast_to(&target)).collect()
}

impl<T: Copy> Array<T> {
    /// Stride-0 view of the receiver at `shape`.
    ///
    /// New leading dimensions and stretched size-1 dimensions get stride 0.
    /// Broadcasting to the receiver's own shape yields an alias view.
    ///
    /// # Errors
    /// `ShapeMismatch` if a dimension is neither 1 nor equal to the target.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Array<T>> {
        let rank = self.rank();
        if shape.len() < rank {
            return Err(ArrayError::ShapeMismatch(
                self.shape().to_vec(),
                shape.to_vec(),
            ));
        }
        let lead = shape.len() - rank;
        let mut stride = vec![0isize; shape.len()];
        for i in 0..rank {
            let old = self.shape[i];
            let new = shape[lead + i];
            if old == new {
                stride[lead + i] = self.stride[i];
            } else if old != 1 {
                return Err(ArrayError::ShapeMismatch(
                    self.shape().to_vec(),
                    shape.to_vec(),
                ));
            }
        }
        self.derive(self.offset as isize, shape.to_vec(), stride)
    }

    /// Place the receiver's axes at `target[start..start + rank]` and give
    /// every other axis of `target` stride 0.
    pub fn embed_axes(&self, target: &[usize], start: usize) -> Result<Array<T>> {
        let rank = self.rank();
        if start + rank > target.len() {
            return Err(ArrayError::ShapeMismatch(
                self.shape().to_vec(),
                target.to_vec(),
            ));
        }
        let mut stride = vec![0isize; target.len()];
        for i in 0..rank {
            let old = self.shape[i];
            let new = target[start + i];
            if old == new {
                stride[start + i] = self.stride[i];
            } else if old != 1 {
                return Err(ArrayError::ShapeMismatch(
                    self.shape().to_vec(),
                    target.to_vec(),
                ));
            }
        }
        self.derive(self.offset as isize, target.to_vec(), stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stride::MajorOrder;

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[&[2, 3], &[3]]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shape(&[&[4, 1], &[1, 5]]).unwrap(), vec![4, 5]);
        assert_eq!(
            broadcast_shape(&[&[8, 1, 6, 1], &[7, 1, 5]]).unwrap(),
            vec![8, 7, 6, 5]
        );
        assert_eq!(broadcast_shape(&[]).unwrap(), Vec::<usize>::new());
        assert_eq!(broadcast_shape(&[&[], &[3]]).unwrap(), vec![3]);
    }

    #[test]
    fn test_broadcast_shape_incompatible() {
        let err = broadcast_shape(&[&[2, 3], &[4]]).unwrap_err();
        assert!(matches!(err, ArrayError::ShapeMismatch(_, _)));
        assert!(broadcast_shape(&[&[2, 1], &[1, 3], &[3, 3]]).is_err());
    }

    #[test]
    fn test_broadcast_to() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[3], vec![1, 2, 3]).unwrap();
        let b = a.broadcast_to(&[2, 3]).unwrap();
        assert_eq!(b.stride(), &[0, 1]);
        assert_eq!(b.to_vec(), vec![1, 2, 3, 1, 2, 3]);
        assert!(b.shares_storage(&a));
    }

    #[test]
    fn test_broadcast_to_stretches_unit_dims() {
        let col = Array::from_vec(MajorOrder::RowMajor, &[2, 1], vec![1, 2]).unwrap();
        let b = col.broadcast_to(&[2, 3]).unwrap();
        assert_eq!(b.stride(), &[1, 0]);
        assert_eq!(b.to_vec(), vec![1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_broadcast_to_identity() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[2, 2], vec![1, 2, 3, 4]).unwrap();
        let b = a.broadcast_to(&[2, 2]).unwrap();
        assert_eq!(b.stride(), a.stride());
        assert!(b == a);
        let bb = b.broadcast_to(&[2, 2]).unwrap();
        assert_eq!(bb.stride(), b.stride());
    }

    #[test]
    fn test_broadcast_to_rejects() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[2, 3], vec![0; 6]).unwrap();
        assert!(a.broadcast_to(&[3]).is_err());
        assert!(a.broadcast_to(&[4, 3]).is_err());
    }

    #[test]
    fn test_broadcast_scalar() {
        let s = Array::scalar(7);
        let b = s.broadcast_to(&[2, 2]).unwrap();
        assert_eq!(b.to_vec(), vec![7; 4]);
    }

    #[test]
    fn test_broadcast_arrays() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[2, 1], vec![1, 2]).unwrap();
        let b = Array::from_vec(MajorOrder::RowMajor, &[3], vec![10, 20, 30]).unwrap();
        let out = broadcast_arrays(&[&a, &b]).unwrap();
        assert_eq!(out[0].shape(), &[2, 3]);
        assert_eq!(out[1].shape(), &[2, 3]);
        assert_eq!(out[1].to_vec(), vec![10, 20, 30, 10, 20, 30]);
    }

    #[test]
    fn test_embed_axes() {
        let v = Array::from_vec(MajorOrder::RowMajor, &[3], vec![5, 6, 7]).unwrap();
        let e = v.embed_axes(&[2, 3, 4], 1).unwrap();
        assert_eq!(e.stride(), &[0, 1, 0]);
        assert_eq!(e.get(&[1, 2, 3]).unwrap(), 7);
        assert!(v.embed_axes(&[2, 3], 0).is_err());
        assert!(v.embed_axes(&[3], 1).is_err());
    }
}
