//! Behaviour shared by the two dense containers, `Image` and `ProjectionData`:
//! element-wise arithmetic, bulk overwrite, and replacement of non-finite
//! values.

use num_traits::Float;
use ndarray::azip;

use crate::{Error, Result};

/// Replace a non-finite value with the nearest finite one: `NaN` becomes zero,
/// `+inf` the largest finite value and `-inf` the most negative finite value.
/// Finite values pass through untouched.
#[inline]
pub fn nan_to_num<T: Float>(x: T) -> T {
    if x.is_nan() { T::zero() }
    else if x.is_infinite() {
        if x > T::zero() { T::max_value() } else { T::min_value() }
    }
    else { x }
}

/// A dense field of `f32`s over some domain described by `Shape`.
pub trait Field: Clone + Sized {

    type Shape: Copy + PartialEq + std::fmt::Debug;

    fn shape(&self) -> Self::Shape;

    fn values(&self) -> &[f32];

    fn values_mut(&mut self) -> &mut [f32];

    /// Name used in error messages
    const NAME: &'static str;

    fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape() == other.shape() { Ok(()) }
        else { Err(Error::shape_mismatch(Self::NAME, self.shape(), other.shape())) }
    }

    /// Overwrite the contents in place with `data`, which must have exactly as
    /// many elements as the field.
    fn fill(&mut self, data: &[f32]) -> Result<()> {
        let values = self.values_mut();
        if values.len() != data.len() {
            return Err(Error::shape_mismatch(Self::NAME, values.len(), data.len()));
        }
        values.copy_from_slice(data);
        Ok(())
    }

    /// Replace every non-finite element by the nearest finite value, in place.
    /// Returns the number of elements which were replaced.
    fn sanitize(&mut self) -> usize {
        let mut replaced = 0;
        for x in self.values_mut() {
            if !x.is_finite() {
                *x = nan_to_num(*x);
                replaced += 1;
            }
        }
        replaced
    }

    /// A copy of this field with every element equal to `value`
    fn uniform_copy(&self, value: f32) -> Self {
        let mut copy = self.clone();
        copy.values_mut().fill(value);
        copy
    }

    fn zip_with(&self, other: &Self, op: impl Fn(f32, f32) -> f32) -> Result<Self> {
        self.check_same_shape(other)?;
        let mut out = self.clone();
        let (o, b): (&mut [f32], &[f32]) = (out.values_mut(), other.values());
        azip!((o in o, &b in b) *o = op(*o, b));
        Ok(out)
    }

    fn try_add(&self, other: &Self) -> Result<Self> { self.zip_with(other, |a, b| a + b) }
    fn try_sub(&self, other: &Self) -> Result<Self> { self.zip_with(other, |a, b| a - b) }
    fn try_mul(&self, other: &Self) -> Result<Self> { self.zip_with(other, |a, b| a * b) }

    /// Element-wise division. Division by zero follows IEEE-754: it yields
    /// infinities or `NaN`, never an error.
    fn try_div(&self, other: &Self) -> Result<Self> { self.zip_with(other, |a, b| a / b) }

    /// Element-wise multiplication, writing the result into `self`
    fn try_mul_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_shape(other)?;
        let (a, b): (&mut [f32], &[f32]) = (self.values_mut(), other.values());
        azip!((a in a, &b in b) *a *= b);
        Ok(())
    }

    fn sum(&self) -> f64 { self.values().iter().map(|&x| x as f64).sum() }

    fn all_finite(&self) -> bool { self.values().iter().all(|x| x.is_finite()) }
}

/// Implement the `std::ops` arithmetic operators on references to a `Field`.
/// Mismatched shapes panic; use the `try_*` methods to get a `Result`.
macro_rules! impl_elementwise_ops {
    ($type:ty) => {
        $crate::field::impl_elementwise_ops!(@op $type, Add, add, try_add);
        $crate::field::impl_elementwise_ops!(@op $type, Sub, sub, try_sub);
        $crate::field::impl_elementwise_ops!(@op $type, Mul, mul, try_mul);
        $crate::field::impl_elementwise_ops!(@op $type, Div, div, try_div);

        impl std::ops::MulAssign<&$type> for $type {
            fn mul_assign(&mut self, rhs: &$type) {
                if let Err(e) = $crate::field::Field::try_mul_assign(self, rhs) { panic!("{e}") }
            }
        }
    };
    (@op $type:ty, $trait:ident, $method:ident, $checked:ident) => {
        impl std::ops::$trait<&$type> for &$type {
            type Output = $type;
            fn $method(self, rhs: &$type) -> $type {
                match $crate::field::Field::$checked(self, rhs) {
                    Ok(out) => out,
                    Err(e)  => panic!("{e}"),
                }
            }
        }
    };
}
pub(crate) use impl_elementwise_ops;
