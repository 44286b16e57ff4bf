//! Quantities: numeric data with a unit
//!
//! A [`Quantity`] holds a scalar or an n-dimensional array of values, the
//! unit expression they are written in, and a target that decides which unit
//! results are shown in. The default target, `auto`, converts every new
//! quantity to base units and picks a readable display unit from the
//! conversion table, so `Quantity::new(&units, 2.0, "kN*mm")` is `2.0 J`.

use std::{fmt, ops::Range};

use ndarray::{ArrayD, Axis, Slice};

use crate::{
    error::UnitError,
    system::UnitSystem,
    table::{AUTO, DIMENSIONLESS, ZERO_SENTINEL},
};

mod convert;
mod values;

pub use values::IntoValues;

/// Numeric data with a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    values: ArrayD<f64>,
    unit: Option<String>,
    target: String,
    symbol: Option<String>,
}

/// The result of indexing a quantity.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A single value of a quantity without a unit
    Number(f64),
    /// A scalar or sub-array with the unit of the indexed quantity
    Quantity(Quantity),
}

impl Quantity {
    /// Creates a quantity and converts it to its display unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse.
    pub fn new(
        system: &UnitSystem,
        values: impl IntoValues,
        unit: &str,
    ) -> Result<Self, UnitError> {
        Self::with_target(system, values, unit, AUTO)
    }

    /// Creates a quantity and converts it to `target`, which is either a unit
    /// expression or `auto`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit or target does not parse, or if the
    /// target has other dimensions and conversions are strict.
    pub fn with_target(
        system: &UnitSystem,
        values: impl IntoValues,
        unit: &str,
        target: &str,
    ) -> Result<Self, UnitError> {
        let mut quantity = Self::from_parts(values.into_values(), Some(unit.to_owned()), AUTO);
        quantity.to(system, target)?;
        Ok(quantity)
    }

    /// Creates a quantity without a unit.
    #[must_use]
    pub fn unitless(values: impl IntoValues) -> Self {
        Self::from_parts(values.into_values(), None, AUTO)
    }

    pub(crate) fn from_parts(values: ArrayD<f64>, unit: Option<String>, target: &str) -> Self {
        Self {
            values,
            unit,
            target: target.to_owned(),
            symbol: None,
        }
    }

    /// Replaces the data and unit without any conversion.
    pub(crate) fn replace(&mut self, values: ArrayD<f64>, unit: Option<String>) {
        self.values = values;
        self.unit = unit;
    }

    /// Returns the values in the current unit.
    #[must_use]
    pub const fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Consumes the quantity and returns its values.
    #[must_use]
    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }

    /// Returns the value of a scalar quantity.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        if self.is_scalar() {
            self.values.first().copied()
        } else {
            None
        }
    }

    /// Returns the unit expression, if any.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Returns the conversion target, a unit expression or `auto`.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the display symbol of the quantity, such as `I` or `v_max`.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Sets the display symbol of the quantity.
    pub fn set_symbol(&mut self, symbol: Option<String>) {
        self.symbol = symbol;
    }

    /// Returns the quantity with a display symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Returns `true` if the quantity is a single value without axes.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.values.ndim() == 0
    }

    /// Returns the shape of the data.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Returns the total number of values.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns the length of the first axis, or one for a scalar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.shape().first().copied().unwrap_or(1)
    }

    /// Returns `true` if the first axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the quantity in place to `target`, a unit expression or
    /// `auto`, and makes `target` the quantity's target.
    ///
    /// With an explicit target, values are multiplied by the ratio of the
    /// two scales, with the Celsius offset applied when converting into or
    /// out of `°C`. With `auto`, values are expressed in base units and the
    /// unit is chosen from the conversion table.
    ///
    /// Quantities without a unit, with the unit `1` or with the zero
    /// sentinel `0` keep their unit.
    ///
    /// # Errors
    ///
    /// Returns an error if a unit does not parse, or if the target has other
    /// dimensions and conversions are strict. The quantity is unchanged on
    /// error.
    pub fn to(&mut self, system: &UnitSystem, target: &str) -> Result<&mut Self, UnitError> {
        convert::convert(self, system, target)?;
        Ok(self)
    }

    /// Returns a copy of the quantity converted to `target`.
    ///
    /// # Errors
    ///
    /// See [`Quantity::to`].
    pub fn converted(&self, system: &UnitSystem, target: &str) -> Result<Self, UnitError> {
        let mut converted = self.clone();
        converted.to(system, target)?;
        Ok(converted)
    }

    /// Reinterprets the values in another unit, then converts them to the
    /// quantity's target.
    ///
    /// # Errors
    ///
    /// See [`Quantity::to`]. The quantity is unchanged on error.
    pub fn set_unit(&mut self, system: &UnitSystem, unit: &str) -> Result<(), UnitError> {
        let mut relabeled = self.clone();
        relabeled.unit = Some(unit.to_owned());
        relabeled.to(system, &self.target)?;
        *self = relabeled;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), UnitError> {
        if index >= self.size() || index >= self.len() {
            return Err(UnitError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Returns the entry at `index` along the first axis.
    ///
    /// A scalar quantity returns itself for index zero. A single value of a
    /// quantity without a unit is returned as a bare number.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IndexOutOfRange`] if the index is past the end.
    pub fn get(&self, index: usize) -> Result<Item, UnitError> {
        self.check_index(index)?;

        if self.is_scalar() {
            return Ok(Item::Quantity(self.clone()));
        }

        let values = self.values.index_axis(Axis(0), index).to_owned();
        let number = (values.ndim() == 0 && self.unit.is_none())
            .then(|| values.first().copied())
            .flatten();
        if let Some(value) = number {
            return Ok(Item::Number(value));
        }

        Ok(Item::Quantity(Self {
            values,
            unit: self.unit.clone(),
            target: self.target.clone(),
            symbol: self.symbol.clone(),
        }))
    }

    /// Returns the entries in `range` along the first axis.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IndexOutOfRange`] for a scalar or if the range is
    /// past the end.
    pub fn slice(&self, range: Range<usize>) -> Result<Self, UnitError> {
        if self.is_scalar() || range.start > range.end || range.end > self.len() {
            return Err(UnitError::IndexOutOfRange {
                index: range.end,
                len: self.len(),
            });
        }

        Ok(Self {
            values: self.values.slice_axis(Axis(0), Slice::from(range)).to_owned(),
            unit: self.unit.clone(),
            target: self.target.clone(),
            symbol: self.symbol.clone(),
        })
    }

    /// Sets the entry at `index` along the first axis to a number in the
    /// quantity's current unit.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IndexOutOfRange`] if the index is past the end.
    pub fn set(&mut self, index: usize, value: f64) -> Result<(), UnitError> {
        self.check_index(index)?;

        if self.is_scalar() {
            self.values.fill(value);
        } else {
            self.values.index_axis_mut(Axis(0), index).fill(value);
        }
        Ok(())
    }

    /// Sets the entry at `index` along the first axis to a quantity,
    /// converted into the quantity's current unit first.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is past the end, if the value cannot be
    /// converted into the current unit, or if its shape does not fit the
    /// entry.
    pub fn assign(
        &mut self,
        system: &UnitSystem,
        index: usize,
        value: &Self,
    ) -> Result<(), UnitError> {
        self.check_index(index)?;

        let converted = match (self.unit.as_deref(), value.unit.as_deref()) {
            (Some(ZERO_SENTINEL), _) => {
                return Err(UnitError::unsupported("assign into a zero sentinel"));
            }
            (Some(unit), Some(_)) if unit != DIMENSIONLESS => value.converted(system, unit)?.values,
            _ => value.values.clone(),
        };

        let mut entry = if self.is_scalar() {
            self.values.view_mut()
        } else {
            self.values.index_axis_mut(Axis(0), index)
        };

        let Some(source) = converted.broadcast(entry.shape()) else {
            return Err(UnitError::ShapeMismatch {
                left: entry.shape().to_vec(),
                right: converted.shape().to_vec(),
            });
        };
        entry.assign(&source);
        Ok(())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.value(), f.precision()) {
            (Some(value), Some(precision)) => write!(f, "{value:.precision$}")?,
            (Some(value), None) => write!(f, "{value:?}")?,
            (None, Some(precision)) => write!(f, "{:.precision$}", self.values)?,
            (None, None) => write!(f, "{}", self.values)?,
        }

        match self.unit.as_deref() {
            None | Some(DIMENSIONLESS) => Ok(()),
            Some(unit) => write!(f, " {unit}"),
        }
    }
}
