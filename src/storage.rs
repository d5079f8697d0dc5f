//! Shared backing buffer for arrays and their views.

use std::cell::RefCell;
use std::rc::Rc;

/// Fixed-capacity element buffer shared by every view derived from it.
///
/// Cloning a `Storage` clones the handle, never the elements. The buffer is
/// released when the last handle is dropped. Borrows of the inner `RefCell`
/// are held only for the duration of a single access.
#[derive(Debug)]
pub struct Storage<T> {
    data: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            data: Rc::clone(&self.data),
        }
    }
}

impl<T: Copy> Storage<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at storage position `pos`. Callers validate `pos` when the
    /// owning view is built.
    #[inline]
    pub fn get(&self, pos: usize) -> T {
        self.data.borrow()[pos]
    }

    #[inline]
    pub fn set(&self, pos: usize, value: T) {
        self.data.borrow_mut()[pos] = value;
    }

    /// Run `f` over the whole buffer.
    #[inline]
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.data.borrow())
    }

    /// Run `f` over the whole buffer mutably.
    #[inline]
    pub fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        f(&mut self.data.borrow_mut())
    }

    /// Whether two handles refer to the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Number of live handles on this buffer.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.data)
    }
}
