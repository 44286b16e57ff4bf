//! Conversion of values written in non-SI units
//!
//! These units are not part of the unit table and cannot appear in unit
//! expressions. Values in them are converted once, on the way in.

use ndarray::ArrayD;
use tracing::debug;

use crate::{
    error::UnitError,
    quantity::{IntoValues, Quantity},
    system::UnitSystem,
};

/// How a legacy value maps to its SI unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegacyFactor {
    /// `si = value * scale`
    Scale(f64),
    /// `si = (value + offset) * scale`
    Affine {
        /// Multiplier applied after the offset
        scale: f64,
        /// Offset added before scaling
        offset: f64,
    },
}

impl LegacyFactor {
    /// Applies the factor to legacy values.
    #[must_use]
    pub fn apply(self, values: &ArrayD<f64>) -> ArrayD<f64> {
        match self {
            Self::Scale(scale) => values.mapv(|value| value * scale),
            Self::Affine { scale, offset } => values.mapv(|value| (value + offset) * scale),
        }
    }
}

/// A legacy unit and the SI unit it converts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyUnit {
    /// The legacy symbol
    pub symbol: &'static str,
    /// The conversion to the SI unit
    pub factor: LegacyFactor,
    /// The SI unit expression
    pub unit: &'static str,
}

/// Every supported legacy unit.
pub const LEGACY_UNITS: &[LegacyUnit] = &[
    LegacyUnit {
        symbol: "mil",
        factor: LegacyFactor::Scale(2.54e-5),
        unit: "m",
    },
    LegacyUnit {
        symbol: "in",
        factor: LegacyFactor::Scale(2.54e-2),
        unit: "m",
    },
    LegacyUnit {
        symbol: "mi",
        factor: LegacyFactor::Scale(1.609_344e3),
        unit: "m",
    },
    LegacyUnit {
        symbol: "ft",
        factor: LegacyFactor::Scale(0.3048),
        unit: "m",
    },
    LegacyUnit {
        symbol: "micron",
        factor: LegacyFactor::Scale(1e-6),
        unit: "m",
    },
    LegacyUnit {
        symbol: "yd",
        factor: LegacyFactor::Scale(0.9144),
        unit: "m",
    },
    LegacyUnit {
        symbol: "psi",
        factor: LegacyFactor::Scale(6.894_757e3),
        unit: "Pa",
    },
    LegacyUnit {
        symbol: "°F",
        factor: LegacyFactor::Affine {
            scale: 5.0 / 9.0,
            offset: 459.67,
        },
        unit: "K",
    },
];

/// Returns the legacy unit with the given symbol.
#[must_use]
pub fn lookup(symbol: &str) -> Option<&'static LegacyUnit> {
    LEGACY_UNITS.iter().find(|legacy| legacy.symbol == symbol)
}

/// Converts values written in a legacy unit to a quantity in SI units.
///
/// # Errors
///
/// Returns [`UnitError::UnknownLegacyUnit`] if the symbol is not a legacy
/// unit.
pub fn convert(
    system: &UnitSystem,
    values: impl IntoValues,
    symbol: &str,
) -> Result<Quantity, UnitError> {
    let legacy = lookup(symbol).ok_or_else(|| UnitError::UnknownLegacyUnit {
        symbol: symbol.to_owned(),
    })?;

    debug!(symbol, unit = legacy.unit, "converting legacy values");
    Quantity::new(system, legacy.factor.apply(&values.into_values()), legacy.unit)
}
