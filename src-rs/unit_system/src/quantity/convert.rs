//! Unit conversion of quantity values

use ndarray::ArrayD;
use tracing::{debug, warn};

use crate::{
    config::ConversionPolicy,
    error::UnitError,
    parser::ParsedUnit,
    quantity::Quantity,
    system::UnitSystem,
    table::{AUTO, CELSIUS_OFFSET, DIMENSIONLESS, ZERO_SENTINEL, is_celsius},
};

/// Converts a quantity in place and records `target` as its target.
///
/// Nothing is modified if the conversion fails.
pub(super) fn convert(
    quantity: &mut Quantity,
    system: &UnitSystem,
    target: &str,
) -> Result<(), UnitError> {
    match quantity.unit.as_deref() {
        None | Some(DIMENSIONLESS) => {}
        Some(ZERO_SENTINEL) => quantity.values.fill(0.0),
        Some(unit) => {
            let parsed = system.parse(unit)?;
            let (values, converted_unit) = if target == AUTO {
                to_display_unit(system, &quantity.values, unit, &parsed)
            } else {
                to_requested_unit(system, &quantity.values, unit, &parsed, target)?
            };

            quantity.values = values;
            quantity.unit = Some(converted_unit);
        }
    }

    target.clone_into(&mut quantity.target);
    Ok(())
}

/// Expresses values in the unit chosen by the conversion table.
fn to_display_unit(
    system: &UnitSystem,
    values: &ArrayD<f64>,
    unit: &str,
    parsed: &ParsedUnit,
) -> (ArrayD<f64>, String) {
    let display_unit = system.conversion_table().resolve(parsed, unit);
    let scale = parsed.scale();
    let offset = if is_celsius(unit) { CELSIUS_OFFSET } else { 0.0 };

    (values.mapv(|value| value * scale + offset), display_unit)
}

/// Expresses values in an explicitly requested unit.
fn to_requested_unit(
    system: &UnitSystem,
    values: &ArrayD<f64>,
    unit: &str,
    parsed: &ParsedUnit,
    target: &str,
) -> Result<(ArrayD<f64>, String), UnitError> {
    let requested = system.parse(target)?;
    let residual = parsed
        .signature()
        .checked_div(requested.signature())
        .ok_or_else(|| UnitError::exponent_overflow("to"))?;

    let converted_unit = if residual.is_dimensionless() {
        target.to_owned()
    } else {
        match system.config().conversion() {
            ConversionPolicy::Strict => {
                return Err(UnitError::DimensionMismatch {
                    from: unit.to_owned(),
                    to: target.to_owned(),
                });
            }
            ConversionPolicy::Lenient => {
                warn!(
                    from = unit,
                    to = target,
                    %residual,
                    "keeping uncanceled factor in converted unit"
                );
                format!("{residual}*{target}")
            }
        }
    };

    let from_scale = parsed.scale();
    let to_scale = requested.scale();
    let from_celsius = is_celsius(unit);
    let to_celsius = is_celsius(target);

    let converted = if from_celsius == to_celsius {
        values.mapv(|value| value * from_scale / to_scale)
    } else {
        let from_offset = if from_celsius { CELSIUS_OFFSET } else { 0.0 };
        let to_offset = if to_celsius { CELSIUS_OFFSET } else { 0.0 };
        values.mapv(|value| (value * from_scale + from_offset - to_offset) / to_scale)
    };

    debug!(from = unit, to = %converted_unit, ratio = from_scale / to_scale, "converted quantity");
    Ok((converted, converted_unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use approx::assert_relative_eq;

    fn scalar(
        system: &UnitSystem,
        value: f64,
        unit: &str,
        target: &str,
    ) -> Result<Quantity, UnitError> {
        Quantity::with_target(system, value, unit, target)
    }

    fn value_of(quantity: &Quantity) -> f64 {
        quantity.value().expect("quantity should be a scalar")
    }

    mod auto_tests {
        use super::*;

        #[test]
        fn prefixed_units_become_base_units() {
            let system = UnitSystem::new();
            let quantity = scalar(&system, 1.5, "km", AUTO)
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 1500.0);
            assert_eq!(quantity.unit(), Some("m"));
        }

        #[test]
        fn celsius_becomes_kelvin() {
            let system = UnitSystem::new();
            let quantity = scalar(&system, 25.0, "°C", AUTO)
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 298.15);
            assert_eq!(quantity.unit(), Some("K"));
        }

        #[test]
        fn auto_is_idempotent() {
            let system = UnitSystem::new();
            let mut quantity = scalar(&system, 2.0, "kN*mm", AUTO)
                .expect("conversion should succeed");
            let once = quantity.clone();
            quantity
                .to(&system, AUTO)
                .expect("conversion should succeed");
            assert_eq!(quantity, once);
            assert_eq!(quantity.unit(), Some("J"));
        }

        #[test]
        fn dimensionless_and_zero_units() {
            let system = UnitSystem::new();
            let quantity = scalar(&system, 0.5, "1", AUTO)
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 0.5);
            assert_eq!(quantity.unit(), Some("1"));

            let quantity = scalar(&system, 7.0, "0", AUTO)
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 0.0);
            assert_eq!(quantity.unit(), Some("0"));
        }
    }

    mod explicit_tests {
        use super::*;

        #[test]
        fn same_dimension() {
            let system = UnitSystem::new();
            let quantity = scalar(&system, 1500.0, "m", "km")
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 1.5);
            assert_eq!(quantity.unit(), Some("km"));
            assert_eq!(quantity.target(), "km");
        }

        #[test]
        fn into_and_out_of_celsius() {
            let system = UnitSystem::new();
            let quantity = scalar(&system, 300.0, "K", "°C")
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 26.85, epsilon = 1e-9);

            let quantity = scalar(&system, 26.85, "°C", "K")
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 300.0, epsilon = 1e-9);

            let quantity = scalar(&system, 20.0, "°C", "°C")
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 20.0);
        }

        #[test]
        fn strict_mismatch_leaves_quantity_untouched() {
            let system = UnitSystem::new();
            let mut quantity = scalar(&system, 3.0, "m", "m")
                .expect("conversion should succeed");
            let before = quantity.clone();

            let error = quantity
                .to(&system, "s")
                .expect_err("conversion should fail");
            assert_eq!(
                error,
                UnitError::DimensionMismatch {
                    from: "m".to_owned(),
                    to: "s".to_owned(),
                }
            );
            assert_eq!(quantity, before);
        }

        #[test]
        fn lenient_mismatch_keeps_the_residual() {
            let system = UnitSystem::with_config(
                Config::new().with_conversion(ConversionPolicy::Lenient),
            );
            let quantity = scalar(&system, 2.0, "m", "ms")
                .expect("conversion should succeed");
            assert_relative_eq!(value_of(&quantity), 2000.0);
            assert_eq!(quantity.unit(), Some("m*s**-1*ms"));
        }

        #[test]
        fn unknown_target_is_a_parse_error() {
            let system = UnitSystem::new();
            let error = scalar(&system, 1.0, "m", "furlong")
                .expect_err("conversion should fail");
            assert!(matches!(error, UnitError::Parse(_)));
        }
    }
}
