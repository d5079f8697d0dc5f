//! Dense N-dimensional arrays with zero-copy strided views.
//!
//! An [`Array`] is a (shape, stride, offset) descriptor over a shared, flat
//! [`Storage`]. Views (selection, transposition, sub-matrices, vectors along a
//! dimension, broadcasting) build new descriptors over the same storage, so
//! writes through any alias are visible through all of them. Copies only
//! happen on request ([`Array::copy`]) or when an operation cannot be
//! expressed as a view (reshaping a non-contiguous array, advanced indexing).
//!
//! # Core Types
//!
//! - [`Array`]: the strided array, generic over its element type
//! - [`MajorOrder`]: row-major (C) or column-major (Fortran) layout
//! - [`Indexer`] / [`AdvancedIndexer`]: basic and integer-array indexing
//! - [`ArrayFactory`]: constructors plus linear algebra through an injected
//!   [`ArrayRoutines`] provider
//!
//! # Example
//!
//! ```rust
//! use strided_array::{ArrayFactory, Array};
//!
//! let f = ArrayFactory::default();
//! let a: Array<i32> = f.from_vec(&[2, 3], (0..6).collect()).unwrap();
//!
//! // Transpose (zero-copy)
//! let t = a.transpose().unwrap();
//! assert_eq!(t.get(&[1, 0]).unwrap(), 1);
//!
//! // Vector along dimension 0
//! assert_eq!(a.get_vector(0, 1).unwrap().to_vec(), vec![1, 4]);
//!
//! // Broadcasting arithmetic
//! let b = f.array(vec![10, 20, 30]);
//! assert_eq!(a.plus(&b).unwrap().to_vec(), vec![10, 21, 32, 13, 24, 35]);
//! ```
//!
//! # Threading
//!
//! Storage is reference counted without atomics, so arrays are neither
//! `Send` nor `Sync`: an array family lives on one thread.

mod array;
pub mod broadcast;
mod element;
mod factory;
pub mod index;
mod list;
mod ops;
mod reduce;
pub mod routines;
mod slice;
mod storage;
pub mod stride;

// ============================================================================
// Array and storage
// ============================================================================
pub use array::{Array, Iter};
pub use storage::Storage;

// ============================================================================
// Element types
// ============================================================================
pub use element::{
    BooleanArray, Complex32Array, ComplexArray, DoubleArray, FloatArray, IndexArray, IntArray,
    LongArray, Scalar,
};

// ============================================================================
// Shape arithmetic and broadcasting
// ============================================================================
pub use broadcast::{broadcast_arrays, broadcast_shape};
pub use stride::{compute_stride, flat_index, linear_index, shape_size, MajorOrder};

// ============================================================================
// Indexing
// ============================================================================
pub use index::{AdvancedIndexer, Indexer, StridedRange};

// ============================================================================
// Factory and routines
// ============================================================================
pub use factory::{ArrayFactory, ArrayFactoryBuilder};
pub use list::ListView;
pub use routines::{ArrayOperation, ArrayRoutines, NaiveRoutines, StridedRoutines};

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur during array operations.
#[derive(Debug, thiserror::Error)]
pub enum ArrayError {
    /// A coordinate is outside its dimension.
    #[error("index {index} out of bounds for dim {dim} of size {size}")]
    IndexOutOfBounds { index: usize, dim: usize, size: usize },

    /// A flat index is outside the array.
    #[error("flat index {index} out of bounds for size {size}")]
    FlatIndexOutOfBounds { index: usize, size: usize },

    /// Invalid axis index for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Indexer lists must address between 1 and `rank` dimensions.
    #[error("{count} indexers for rank {rank}")]
    IndexerCount { count: usize, rank: usize },

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Total element counts differ.
    #[error("size mismatch: expected {expected}, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    /// Array rank is not the one the operation requires.
    #[error("rank mismatch: expected {expected}, found {found}")]
    RankMismatch { expected: usize, found: usize },

    /// The operation needs a 1-D array or a single row or column.
    #[error("vector required, got shape {0:?}")]
    RequiresVector(Vec<usize>),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Stride array length doesn't match dimensions.
    #[error("stride and shape length mismatch")]
    StrideLengthMismatch,

    /// A strided layout reaches outside its storage.
    #[error("offset overflow: layout exceeds storage")]
    OffsetOverflow,

    /// A range step of zero.
    #[error("invalid step 0")]
    InvalidStep,
}

/// Result type for array operations.
pub type Result<T> = std::result::Result<T, ArrayError>;
