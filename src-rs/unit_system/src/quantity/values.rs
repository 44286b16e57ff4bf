//! Conversion of numeric input into quantity data

use ndarray::{Array, Array1, ArrayD, ArrayView, Dimension, arr0};

/// Numeric data that can back a [`Quantity`](crate::Quantity).
pub trait IntoValues {
    /// Converts the data into an n-dimensional array.
    fn into_values(self) -> ArrayD<f64>;
}

impl IntoValues for f64 {
    fn into_values(self) -> ArrayD<f64> {
        arr0(self).into_dyn()
    }
}

impl IntoValues for i32 {
    fn into_values(self) -> ArrayD<f64> {
        f64::from(self).into_values()
    }
}

impl IntoValues for Vec<f64> {
    fn into_values(self) -> ArrayD<f64> {
        Array1::from(self).into_dyn()
    }
}

impl IntoValues for &[f64] {
    fn into_values(self) -> ArrayD<f64> {
        self.to_vec().into_values()
    }
}

impl<const N: usize> IntoValues for [f64; N] {
    fn into_values(self) -> ArrayD<f64> {
        self.to_vec().into_values()
    }
}

impl<D: Dimension> IntoValues for Array<f64, D> {
    fn into_values(self) -> ArrayD<f64> {
        self.into_dyn()
    }
}

impl<D: Dimension> IntoValues for ArrayView<'_, f64, D> {
    fn into_values(self) -> ArrayD<f64> {
        self.to_owned().into_dyn()
    }
}
