//! Fixed-size list view over a vector-shaped array.

use crate::array::{Array, Iter};
use crate::{ArrayError, Result};

/// List-like access to the elements of a vector.
///
/// The view aliases the array: `set` writes through to the shared storage.
/// The length is fixed, so structural mutations fail with
/// [`ArrayError::Unsupported`].
#[derive(Debug, Clone)]
pub struct ListView<T: Copy> {
    vector: Array<T>,
}

impl<T: Copy> ListView<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.vector.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<T> {
        self.vector.get(&[index])
    }

    /// Replace the element at `index`, returning the previous value.
    pub fn set(&self, index: usize, value: T) -> Result<T> {
        let old = self.vector.get(&[index])?;
        self.vector.set(&[index], value)?;
        Ok(old)
    }

    pub fn iter(&self) -> Iter<T> {
        self.vector.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.vector.to_vec()
    }

    pub fn push(&self, _value: T) -> Result<()> {
        Err(ArrayError::Unsupported("push on a fixed-size list"))
    }

    pub fn insert(&self, _index: usize, _value: T) -> Result<()> {
        Err(ArrayError::Unsupported("insert on a fixed-size list"))
    }

    pub fn remove(&self, _index: usize) -> Result<T> {
        Err(ArrayError::Unsupported("remove on a fixed-size list"))
    }

    pub fn clear(&self) -> Result<()> {
        Err(ArrayError::Unsupported("clear on a fixed-size list"))
    }
}

impl<T: Copy> Array<T> {
    /// List view of a vector-shaped array.
    ///
    /// # Errors
    /// `RequiresVector` unless the array is 1-D or a single row or column.
    pub fn as_list(&self) -> Result<ListView<T>> {
        if !self.is_vector() {
            return Err(ArrayError::RequiresVector(self.shape().to_vec()));
        }
        let dim = self.shape().iter().position(|&n| n > 1).unwrap_or(0);
        Ok(ListView {
            vector: self.get_vector(dim, 0)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stride::MajorOrder;

    #[test]
    fn test_list_reads_and_writes_through() {
        let a = Array::from_vec(MajorOrder::RowMajor, &[2, 3], (0..6).collect()).unwrap();
        let column = a.get_column(1).unwrap();
        let list = column.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_vec(), vec![1, 4]);
        assert_eq!(list.set(1, 40).unwrap(), 4);
        assert_eq!(a.get(&[1, 1]).unwrap(), 40);
        assert!(list.get(2).is_err());
        assert_eq!(list.iter().sum::<i32>(), 41);
    }

    #[test]
    fn test_structural_mutation_is_unsupported() {
        let v = Array::from_vec(MajorOrder::RowMajor, &[3], vec![1.0, 2.0, 3.0]).unwrap();
        let list = v.as_list().unwrap();
        assert!(matches!(list.push(4.0), Err(ArrayError::Unsupported(_))));
        assert!(matches!(list.insert(0, 4.0), Err(ArrayError::Unsupported(_))));
        assert!(matches!(list.remove(0), Err(ArrayError::Unsupported(_))));
        assert!(matches!(list.clear(), Err(ArrayError::Unsupported(_))));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_as_list_requires_vector() {
        let m = Array::from_elem(MajorOrder::RowMajor, &[2, 2], 0);
        assert!(matches!(
            m.as_list().unwrap_err(),
            ArrayError::RequiresVector(_)
        ));
        let row = Array::from_elem(MajorOrder::ColMajor, &[1, 4], 0);
        assert_eq!(row.as_list().unwrap().len(), 4);
    }
}
