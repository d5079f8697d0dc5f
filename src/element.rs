//! Element type bounds and the concrete array aliases.

use num_complex::{Complex, Complex32, Complex64};
use num_traits::Num;

use crate::Array;

/// Numeric element types supported by the arithmetic, statistics and
/// linear-algebra operations.
///
/// Real types use the identity for [`Scalar::conj`]; complex types override
/// it with actual conjugation.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug + Num + 'static {
    #[inline(always)]
    fn conj(self) -> Self {
        self
    }

    /// Convert a count into the element type, used by `mean`.
    fn from_usize(n: usize) -> Self;
}

macro_rules! impl_scalar_real {
    ($($t:ty),*) => {
        $(impl Scalar for $t {
            #[inline(always)]
            fn from_usize(n: usize) -> Self {
                n as $t
            }
        })*
    };
}

impl_scalar_real!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T> Scalar for Complex<T>
where
    T: Scalar + std::ops::Neg<Output = T>,
{
    #[inline(always)]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline(always)]
    fn from_usize(n: usize) -> Self {
        Complex::new(T::from_usize(n), T::zero())
    }
}

/// Array of indices, used by advanced indexing.
pub type IndexArray = Array<usize>;
pub type IntArray = Array<i32>;
pub type LongArray = Array<i64>;
pub type FloatArray = Array<f32>;
pub type DoubleArray = Array<f64>;
pub type ComplexArray = Array<Complex64>;
pub type Complex32Array = Array<Complex32>;
pub type BooleanArray = Array<bool>;
