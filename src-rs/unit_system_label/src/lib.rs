#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! Axis labels for unit_system quantities

use tracing::debug;
use unit_system::{Quantity, UnitError, UnitSystem, table::DIMENSIONLESS};

mod config;
mod error;
pub mod format;
pub mod symbols;

pub use config::{Config, LabelStyle};
pub use error::LabelError;

/// Returns the symbol and unit an axis showing `quantity` is labelled
/// with.
///
/// The unit is `None` for quantities without a unit or with the
/// dimensionless unit.
#[must_use]
pub fn axis_units(quantity: &Quantity) -> (Option<&str>, Option<&str>) {
    let unit = quantity.unit().filter(|unit| *unit != DIMENSIONLESS);
    (quantity.symbol(), unit)
}

/// Builds the axis label for a quantity.
#[must_use]
pub fn label(quantity: &Quantity, config: Config) -> String {
    let (symbol, unit) = axis_units(quantity);
    format::axis_label(symbol, unit, config.style())
}

/// Converts a quantity to the unit requested for an axis.
///
/// # Errors
///
/// Returns [`LabelError::Conversion`] unless the converted quantity is in
/// exactly the requested unit, and [`LabelError::Unit`] if a unit does not
/// parse.
pub fn convert(
    system: &UnitSystem,
    quantity: &Quantity,
    target: &str,
) -> Result<Quantity, LabelError> {
    let converted = match quantity.converted(system, target) {
        Ok(converted) => converted,
        Err(UnitError::DimensionMismatch { from, to }) => {
            return Err(LabelError::Conversion {
                requested: to,
                actual: from,
            });
        }
        Err(error) => return Err(error.into()),
    };

    match converted.unit() {
        Some(unit) if unit == target => {
            debug!(unit, "converted quantity for axis");
            Ok(converted)
        }
        actual => Err(LabelError::Conversion {
            requested: target.to_owned(),
            actual: actual.unwrap_or_default().to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unit_system::{Config as UnitConfig, ConversionPolicy};

    fn quantity(system: &UnitSystem, values: Vec<f64>, unit: &str) -> Quantity {
        Quantity::new(system, values, unit).expect("quantity should be valid")
    }

    mod label_tests {
        use super::*;

        #[test]
        fn standard_symbols() {
            let system = UnitSystem::new();
            let current = quantity(&system, vec![1.0, 2.0, 3.0], "A");
            let voltage = quantity(&system, vec![4.0, 5.0, 6.0], "V");

            assert_eq!(label(&current, Config::new()), r"$I\;/\;{\rm A}$");
            assert_eq!(label(&voltage, Config::new()), r"$U\;/\;{\rm V}$");
        }

        #[test]
        fn quantity_symbols_win() {
            let system = UnitSystem::new();
            let rise = quantity(&system, vec![1.0, 2.0], "s").with_symbol("t_r");
            assert_eq!(label(&rise, Config::new()), r"$t_{\rm r}\;/\;{\rm s}$");
        }

        #[test]
        fn compound_units() {
            let system = UnitSystem::new();
            let speed = quantity(&system, vec![4.0, 5.0], "m/s");
            assert_eq!(label(&speed, Config::new()), r"$q\;/\;{\rm (m\cdot s^-1)}$");
        }

        #[test]
        fn captions() {
            let system = UnitSystem::new();
            let current = Quantity::with_target(&system, vec![1.0], "A", "mA")
                .expect("quantity should be valid");
            let config = Config::new().with_style(LabelStyle::Caption);
            assert_eq!(label(&current, config), r"${\rm Current\;(mA)}$");
        }

        #[test]
        fn dimensionless() {
            let ratio = Quantity::unitless(vec![0.5]);
            assert_eq!(label(&ratio, Config::new()), "$q$");
        }
    }

    mod convert_tests {
        use super::*;

        #[test]
        fn to_a_compatible_unit() {
            let system = UnitSystem::new();
            let times = quantity(&system, vec![0.0, 1.0, 2.0], "s");

            let converted = convert(&system, &times, "ms")
                .expect("conversion should succeed");
            assert_eq!(converted.unit(), Some("ms"));
            assert_eq!(
                converted.values().iter().copied().collect::<Vec<_>>(),
                vec![0.0, 1000.0, 2000.0]
            );
        }

        #[test]
        fn to_an_incompatible_unit() {
            let system = UnitSystem::new();
            let times = quantity(&system, vec![0.0, 1.0], "s");

            let error = convert(&system, &times, "mm")
                .expect_err("conversion should fail");
            assert_eq!(
                error,
                LabelError::Conversion {
                    requested: "mm".to_owned(),
                    actual: "s".to_owned(),
                }
            );
        }

        #[test]
        fn lenient_residuals_are_rejected() {
            let config = UnitConfig::new().with_conversion(ConversionPolicy::Lenient);
            let system = UnitSystem::with_config(config);
            let times = quantity(&system, vec![1.0], "s");

            let error = convert(&system, &times, "mm")
                .expect_err("conversion should fail");
            assert!(matches!(error, LabelError::Conversion { .. }));
        }

        #[test]
        fn unknown_units() {
            let system = UnitSystem::new();
            let times = quantity(&system, vec![1.0], "s");
            let error = convert(&system, &times, "parsec")
                .expect_err("conversion should fail");
            assert!(matches!(error, LabelError::Unit(_)));
        }
    }
}
