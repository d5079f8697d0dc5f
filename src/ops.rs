//! Broadcasting arithmetic and statistics for numeric arrays.

use std::ops::Neg;

use num_traits::Float;

use crate::array::Array;
use crate::element::Scalar;
use crate::{ArrayError, Result};

impl<T: Scalar> Array<T> {
    // ------------------------------------------------------------------
    // Element-wise arithmetic
    // ------------------------------------------------------------------

    pub fn plus(&self, other: &Array<T>) -> Result<Array<T>> {
        self.combine(other, |a, b| a + b)
    }

    pub fn minus(&self, other: &Array<T>) -> Result<Array<T>> {
        self.combine(other, |a, b| a - b)
    }

    pub fn times(&self, other: &Array<T>) -> Result<Array<T>> {
        self.combine(other, |a, b| a * b)
    }

    pub fn div(&self, other: &Array<T>) -> Result<Array<T>> {
        self.combine(other, |a, b| a / b)
    }

    pub fn plus_assign(&self, other: &Array<T>) -> Result<()> {
        self.combine_assign(other, |a, b| a + b)
    }

    pub fn minus_assign(&self, other: &Array<T>) -> Result<()> {
        self.combine_assign(other, |a, b| a - b)
    }

    pub fn times_assign(&self, other: &Array<T>) -> Result<()> {
        self.combine_assign(other, |a, b| a * b)
    }

    pub fn div_assign(&self, other: &Array<T>) -> Result<()> {
        self.combine_assign(other, |a, b| a / b)
    }

    pub fn plus_scalar(&self, value: T) -> Array<T> {
        self.map(|a| a + value)
    }

    pub fn minus_scalar(&self, value: T) -> Array<T> {
        self.map(|a| a - value)
    }

    pub fn times_scalar(&self, value: T) -> Array<T> {
        self.map(|a| a * value)
    }

    pub fn div_scalar(&self, value: T) -> Array<T> {
        self.map(|a| a / value)
    }

    /// Element-wise complex conjugate; the identity for real types.
    pub fn conj(&self) -> Array<T> {
        self.map(Scalar::conj)
    }

    // ------------------------------------------------------------------
    // Sums and products
    // ------------------------------------------------------------------

    pub fn sum(&self) -> T {
        self.reduce(T::zero(), |acc, x| acc + x)
    }

    pub fn prod(&self) -> T {
        self.reduce(T::one(), |acc, x| acc * x)
    }

    /// Sum of every vector along `dim`.
    pub fn sum_dim(&self, dim: usize) -> Result<Array<T>> {
        self.reduce_vectors(dim, |v| v.sum())
    }

    pub fn prod_dim(&self, dim: usize) -> Result<Array<T>> {
        self.reduce_vectors(dim, |v| v.prod())
    }

    /// Running sum of a vector, with the receiver's shape.
    ///
    /// # Errors
    /// `RequiresVector` if the receiver is not a vector.
    pub fn cumsum(&self) -> Result<Array<T>> {
        if !self.is_vector() {
            return Err(ArrayError::RequiresVector(self.shape().to_vec()));
        }
        let mut acc = T::zero();
        Ok(self.map(|x| {
            acc = acc + x;
            acc
        }))
    }

    /// Running sum along every vector of `dim`.
    pub fn cumsum_dim(&self, dim: usize) -> Result<Array<T>> {
        let out = self.copy();
        for i in 0..self.vectors(dim)? {
            let v = out.get_vector(dim, i)?;
            let mut acc = T::zero();
            v.map_assign(|x| {
                acc = acc + x;
                acc
            });
        }
        Ok(out)
    }
}

impl<T: Scalar + Neg<Output = T>> Array<T> {
    pub fn negate(&self) -> Array<T> {
        self.map(|a| -a)
    }
}

// ----------------------------------------------------------------------
// Ordered statistics
// ----------------------------------------------------------------------

impl<T: Scalar + PartialOrd> Array<T> {
    /// Smallest element, or `None` for an empty array.
    pub fn min(&self) -> Option<T> {
        self.iter().reduce(|a, b| if b < a { b } else { a })
    }

    /// Largest element, or `None` for an empty array.
    pub fn max(&self) -> Option<T> {
        self.iter().reduce(|a, b| if b > a { b } else { a })
    }

    pub fn min_dim(&self, dim: usize) -> Result<Array<T>> {
        self.require_nonempty_dim(dim)?;
        self.reduce_vectors(dim, |v| v.min().unwrap_or_else(T::zero))
    }

    pub fn max_dim(&self, dim: usize) -> Result<Array<T>> {
        self.require_nonempty_dim(dim)?;
        self.reduce_vectors(dim, |v| v.max().unwrap_or_else(T::zero))
    }

    fn require_nonempty_dim(&self, dim: usize) -> Result<()> {
        let rank = self.rank();
        match self.shape().get(dim) {
            None => Err(ArrayError::InvalidAxis { axis: dim, rank }),
            Some(0) => Err(ArrayError::Unsupported("min or max over an empty dimension")),
            Some(_) => Ok(()),
        }
    }
}

impl<T: Scalar + Float> Array<T> {
    /// Arithmetic mean of every element; NaN for an empty array.
    pub fn mean(&self) -> T {
        self.sum() / <T as Scalar>::from_usize(self.size())
    }

    /// Mean of every vector along `dim`.
    pub fn mean_dim(&self, dim: usize) -> Result<Array<T>> {
        self.reduce_vectors(dim, |v| v.mean())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stride::MajorOrder;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn make_array(rows: usize, cols: usize) -> Array<f64> {
        let data = (0..rows * cols).map(|x| x as f64).collect();
        Array::from_vec(MajorOrder::RowMajor, &[rows, cols], data).unwrap()
    }

    #[test]
    fn test_broadcast_plus() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[2, 3], (0..6).collect()).unwrap();
        let b = Array::from_vec(MajorOrder::RowMajor, &[3], vec![10, 20, 30]).unwrap();
        let c = a.plus(&b).unwrap();
        assert_eq!(c.to_vec(), vec![10, 21, 32, 13, 24, 35]);
    }

    #[test]
    fn test_arithmetic() {
        let a = make_array(2, 2);
        let b = Array::from_elem(MajorOrder::RowMajor, &[2, 2], 2.0);
        assert_eq!(a.minus(&b).unwrap().to_vec(), vec![-2.0, -1.0, 0.0, 1.0]);
        assert_eq!(a.times(&b).unwrap().to_vec(), vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(a.div(&b).unwrap().to_vec(), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(a.plus_scalar(1.0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.times_scalar(3.0).get(&[1, 1]).unwrap(), 9.0);
        assert_eq!(a.negate().get(&[0, 1]).unwrap(), -1.0);
    }

    #[test]
    fn test_assign_forms() {
        let a = make_array(2, 2);
        let row = Array::from_vec(MajorOrder::RowMajor, &[2], vec![1.0, 2.0]).unwrap();
        a.plus_assign(&row).unwrap();
        assert_eq!(a.to_vec(), vec![1.0, 3.0, 3.0, 5.0]);
        a.times_assign(&Array::scalar(2.0)).unwrap();
        assert_eq!(a.to_vec(), vec![2.0, 6.0, 6.0, 10.0]);
        a.minus_assign(&Array::scalar(2.0)).unwrap();
        a.div_assign(&Array::scalar(2.0)).unwrap();
        assert_eq!(a.to_vec(), vec![0.0, 2.0, 2.0, 4.0]);
    }

    #[test]
    fn test_sum_prod() {
        let a = make_array(2, 3);
        assert_relative_eq!(a.sum(), 15.0);
        assert_eq!(a.sum_dim(0).unwrap().to_vec(), vec![3.0, 5.0, 7.0]);
        assert_eq!(a.sum_dim(1).unwrap().to_vec(), vec![3.0, 12.0]);
        let b = a.plus_scalar(1.0);
        assert_relative_eq!(b.prod(), 720.0);
        assert_eq!(b.prod_dim(1).unwrap().to_vec(), vec![6.0, 120.0]);
    }

    #[test]
    fn test_min_max() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[2, 3], vec![3, -1, 4, 1, 5, -9]).unwrap();
        assert_eq!(a.min(), Some(-9));
        assert_eq!(a.max(), Some(5));
        assert_eq!(a.min_dim(0).unwrap().to_vec(), vec![1, -1, -9]);
        assert_eq!(a.max_dim(1).unwrap().to_vec(), vec![4, 5]);
        let empty = Array::<i32>::from_vec(MajorOrder::RowMajor, &[0], vec![]).unwrap();
        assert_eq!(empty.min(), None);
    }

    #[test]
    fn test_min_dim_empty_dimension() {
        let a = Array::<i32>::from_vec(MajorOrder::RowMajor, &[0, 2], vec![]).unwrap();
        assert!(matches!(
            a.min_dim(0).unwrap_err(),
            ArrayError::Unsupported(_)
        ));
        assert!(matches!(
            a.max_dim(2).unwrap_err(),
            ArrayError::InvalidAxis { axis: 2, rank: 2 }
        ));
    }

    #[test]
    fn test_mean() {
        let a = make_array(2, 3);
        assert_relative_eq!(a.mean(), 2.5);
        let m = a.mean_dim(1).unwrap();
        assert_relative_eq!(m.get(&[0]).unwrap(), 1.0);
        assert_relative_eq!(m.get(&[1]).unwrap(), 4.0);
    }

    #[test]
    fn test_cumsum() {
        let v = Array::from_vec(MajorOrder::RowMajor, &[1, 4], vec![1, 2, 3, 4]).unwrap();
        let c = v.cumsum().unwrap();
        assert_eq!(c.shape(), &[1, 4]);
        assert_eq!(c.to_vec(), vec![1, 3, 6, 10]);
        let m = Array::from_vec(MajorOrder::RowMajor, &[2, 2], vec![1, 2, 3, 4]).unwrap();
        assert!(matches!(
            m.cumsum().unwrap_err(),
            ArrayError::RequiresVector(_)
        ));
    }

    #[test]
    fn test_cumsum_dim() {
        let a = make_array(2, 3);
        let down = a.cumsum_dim(0).unwrap();
        assert_eq!(down.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 5.0, 7.0]);
        let across = a.cumsum_dim(1).unwrap();
        assert_eq!(across.to_vec(), vec![0.0, 1.0, 3.0, 3.0, 7.0, 12.0]);
        // the receiver is untouched
        assert_eq!(a.get(&[1, 2]).unwrap(), 5.0);
    }

    #[test]
    fn test_complex() {
        let z = Array::from_vec(
            MajorOrder::RowMajor,
            &[2],
            vec![Complex64::new(1.0, 1.0), Complex64::new(2.0, -3.0)],
        )
        .unwrap();
        assert_eq!(z.sum(), Complex64::new(3.0, -2.0));
        assert_eq!(z.conj().get(&[0]).unwrap(), Complex64::new(1.0, -1.0));
        let zz = z.times(&z.conj()).unwrap();
        assert_eq!(zz.get(&[1]).unwrap(), Complex64::new(13.0, 0.0));
    }
}
