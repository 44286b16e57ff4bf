//! Utilities for one-dimensional sequences of quantities

use ndarray::{ArrayD, Axis, arr0};

use crate::{
    algebra::{self, Operation, Propagated, ResultUnit, UnitOperand},
    engine::{self, Evaluated, Operand},
    error::UnitError,
    quantity::Quantity,
    signature::Signature,
    system::UnitSystem,
    table::{AUTO, ZERO_SENTINEL},
};

/// Finds the fractional index at which `sequence` last falls to `target`.
///
/// The lower index is the last index at or after `start` whose value is at
/// most `target`, the upper index is the one after it, and the result is
/// interpolated linearly between them in base units. Returns `None` if the
/// sequence is not one-dimensional, if no such index exists, or if it is the
/// last one.
///
/// # Errors
///
/// Returns an error if the units of the sequence and the target cannot be
/// compared, or if the target is not a single value.
#[expect(
    clippy::cast_precision_loss,
    reason = "sequence indices are far below 2^52"
)]
pub fn threshold(
    system: &UnitSystem,
    sequence: &Quantity,
    target: &Quantity,
    start: usize,
) -> Result<Option<f64>, UnitError> {
    if sequence.shape().len() != 1 {
        return Ok(None);
    }
    if target.size() != 1 {
        return Err(UnitError::ShapeMismatch {
            left: sequence.shape().to_vec(),
            right: target.shape().to_vec(),
        });
    }

    let below = system.less_equal(sequence, target)?;
    let Some(lower) = below
        .iter()
        .enumerate()
        .skip(start)
        .filter_map(|(index, below)| below.then_some(index))
        .last()
    else {
        return Ok(None);
    };

    let upper = lower + 1;
    if upper >= sequence.len() {
        return Ok(None);
    }

    let (values, _) = engine::base_values(system, sequence)?;
    let (target_values, _) = engine::base_values(system, target)?;
    let Some(&target_value) = target_values.first() else {
        return Ok(None);
    };

    let (low, high) = (values[[lower]], values[[upper]]);
    let fraction = (target_value - low) / (high - low);

    Ok(Some(lower as f64 + fraction))
}

/// Interpolates a one-dimensional sequence linearly at a fractional index.
///
/// The result keeps the unit and target of the sequence. Returns `None` if
/// the sequence is not one-dimensional.
///
/// # Errors
///
/// Returns [`UnitError::IndexOutOfRange`] if either neighbouring index is
/// outside of the sequence.
pub fn interpolate(sequence: &Quantity, index: f64) -> Result<Option<Quantity>, UnitError> {
    if sequence.shape().len() != 1 {
        return Ok(None);
    }

    let len = sequence.len();
    let out_of_range = |index| UnitError::IndexOutOfRange { index, len };
    let lower = to_index(index.floor())
        .ok_or_else(|| out_of_range(usize::MAX))?;
    let upper = to_index(index.ceil())
        .ok_or_else(|| out_of_range(usize::MAX))?;
    if upper >= len {
        return Err(out_of_range(upper));
    }

    let values = sequence.values();
    let (low, high) = (values[[lower]], values[[upper]]);
    let value = low + (high - low) * (index - index.floor());

    let mut interpolated = Quantity::from_parts(
        arr0(value).into_dyn(),
        sequence.unit().map(str::to_owned),
        sequence.target(),
    );
    interpolated
        .set_symbol(sequence.symbol().map(str::to_owned));
    Ok(Some(interpolated))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is checked to be a non-negative integer in range"
)]
fn to_index(value: f64) -> Option<usize> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (value.is_finite() && (0.0..LIMIT).contains(&value)).then(|| value as usize)
}

/// Joins operands along their first axis.
///
/// Quantities are converted to their display units first and must all share
/// dimensions; the result is a quantity in the unit of the first of them.
/// As soon as one operand is a number, plain data or a quantity without a
/// unit, the result is plain numeric data.
///
/// # Errors
///
/// Returns [`UnitError::IncompatibleUnits`] if two quantities have different
/// dimensions and [`UnitError::ShapeMismatch`] if the operands cannot be
/// joined.
pub fn concatenate(system: &UnitSystem, operands: &[Operand<'_>]) -> Result<Evaluated, UnitError> {
    if operands.is_empty() {
        return Err(UnitError::ArityMismatch {
            operation: "concatenate".to_owned(),
            expected: 1,
            found: 0,
        });
    }

    let mut parts = Vec::with_capacity(operands.len());
    let mut reference: Option<(String, Signature)> = None;
    let mut plain = false;

    for operand in operands {
        match operand {
            Operand::Quantity(quantity) => {
                let converted = quantity.converted(system, AUTO)?;
                match converted.unit() {
                    None => plain = true,
                    Some(ZERO_SENTINEL) => {}
                    Some(unit) => {
                        let signature = system.parse(unit)?.signature().clone();
                        match &reference {
                            None => reference = Some((unit.to_owned(), signature)),
                            Some((_, expected)) => check_dimensions(expected, &signature)?,
                        }
                    }
                }
                parts.push(converted.into_values());
            }
            Operand::Number(value) => {
                plain = true;
                parts.push(engine::number_as_array(*value));
            }
            Operand::Array(values) => {
                plain = true;
                parts.push((*values).clone());
            }
        }
    }

    let joined = join(&parts)?;
    Ok(match reference {
        Some((unit, _)) if !plain => {
            Evaluated::Quantity(Quantity::from_parts(joined, Some(unit), AUTO))
        }
        _ => Evaluated::Numeric(joined),
    })
}

/// Checks that dividing two signatures leaves nothing behind.
fn check_dimensions(expected: &Signature, found: &Signature) -> Result<(), UnitError> {
    let operand = |signature: &Signature| UnitOperand::Quantity {
        signature: signature.clone(),
        zero: false,
    };
    let ratio = algebra::propagate(Operation::Divide, &[operand(expected), operand(found)])?;

    if ratio == Propagated::Unit(ResultUnit::Signature(Signature::dimensionless())) {
        Ok(())
    } else {
        Err(UnitError::IncompatibleUnits {
            operation: "concatenate".to_owned(),
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

fn join(parts: &[ArrayD<f64>]) -> Result<ArrayD<f64>, UnitError> {
    let views: Vec<_> = parts.iter().map(ArrayD::view).collect();
    ndarray::concatenate(Axis(0), &views).map_err(|_| {
        let first = parts
            .first()
            .map(|part| part.shape().to_vec())
            .unwrap_or_default();
        let mismatched = parts
            .iter()
            .find(|part| part.ndim() == 0 || part.shape().get(1..) != first.get(1..))
            .map_or_else(|| first.clone(), |part| part.shape().to_vec());
        UnitError::ShapeMismatch {
            left: first,
            right: mismatched,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sequence(system: &UnitSystem, values: Vec<f64>, unit: &str) -> Quantity {
        Quantity::new(system, values, unit).expect("quantity should be valid")
    }

    mod threshold_tests {
        use super::*;

        #[test]
        fn interpolates_between_neighbours() {
            let system = UnitSystem::new();
            let heights = sequence(&system, vec![1.0, 2.0, 3.0, 4.0], "m");
            let target = Quantity::new(&system, 2.5, "m")
                .expect("quantity should be valid");

            let index = system
                .threshold(&heights, &target, 0)
                .expect("threshold should succeed");
            assert_relative_eq!(index.expect("index should exist"), 1.5);
        }

        #[test]
        fn uses_the_last_crossing_after_start() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![0.0, 10.0, 0.0, 10.0], "V");
            let target = Quantity::new(&system, 5.0, "V")
                .expect("quantity should be valid");

            let index = threshold(&system, &values, &target, 0)
                .expect("threshold should succeed");
            assert_relative_eq!(index.expect("index should exist"), 2.5);

            let index = threshold(&system, &values, &target, 3)
                .expect("threshold should succeed");
            assert_eq!(index, None);
        }

        #[test]
        fn compares_in_base_units() {
            let system = UnitSystem::new();
            let values = Quantity::with_target(&system, vec![1.0, 3.0], "km", "km")
                .expect("quantity should be valid");
            let target = Quantity::new(&system, 2000.0, "m")
                .expect("quantity should be valid");

            let index = threshold(&system, &values, &target, 0)
                .expect("threshold should succeed");
            assert_relative_eq!(index.expect("index should exist"), 0.5);
        }

        #[test]
        fn no_crossing() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![5.0, 6.0], "m");
            let target = Quantity::new(&system, 1.0, "m")
                .expect("quantity should be valid");
            assert_eq!(
                threshold(&system, &values, &target, 0).expect("threshold should succeed"),
                None
            );
        }

        #[test]
        fn last_index_has_no_upper_neighbour() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![5.0, 1.0], "m");
            let target = Quantity::new(&system, 2.0, "m")
                .expect("quantity should be valid");
            assert_eq!(
                threshold(&system, &values, &target, 0).expect("threshold should succeed"),
                None
            );
        }

        #[test]
        fn different_dimensions() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![1.0, 2.0], "m");
            let target = Quantity::new(&system, 1.0, "s")
                .expect("quantity should be valid");
            let error = threshold(&system, &values, &target, 0)
                .expect_err("threshold should fail");
            assert!(matches!(error, UnitError::IncompatibleUnits { .. }));
        }
    }

    mod interpolate_tests {
        use super::*;

        #[test]
        fn between_elements() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![10.0, 20.0, 30.0], "s")
                .with_symbol("t");

            let value = interpolate(&values, 1.25)
                .expect("interpolation should succeed")
                .expect("sequence is one-dimensional");
            assert_relative_eq!(value.value().expect("scalar"), 22.5);
            assert_eq!(value.unit(), Some("s"));
            assert_eq!(value.symbol(), Some("t"));
        }

        #[test]
        fn at_an_element() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![10.0, 20.0, 30.0], "s");
            let value = interpolate(&values, 2.0)
                .expect("interpolation should succeed")
                .expect("sequence is one-dimensional");
            assert_relative_eq!(value.value().expect("scalar"), 30.0);
        }

        #[test]
        fn out_of_range() {
            let system = UnitSystem::new();
            let values = sequence(&system, vec![10.0, 20.0], "s");
            let error = interpolate(&values, 1.5)
                .expect_err("interpolation should fail");
            assert_eq!(error, UnitError::IndexOutOfRange { index: 2, len: 2 });
            assert!(interpolate(&values, -0.5).is_err());
        }

        #[test]
        fn scalars_are_not_sequences() {
            let system = UnitSystem::new();
            let value = Quantity::new(&system, 1.0, "s")
                .expect("quantity should be valid");
            assert_eq!(interpolate(&value, 0.0).expect("interpolation should succeed"), None);
        }
    }

    mod concatenate_tests {
        use super::*;

        #[test]
        fn quantities_in_display_units() {
            let system = UnitSystem::new();
            let first = Quantity::with_target(&system, vec![1.0, 2.0], "km", "km")
                .expect("quantity should be valid");
            let second = sequence(&system, vec![500.0], "m");

            let joined = concatenate(&system, &[(&first).into(), (&second).into()])
                .expect("concatenate should succeed")
                .into_quantity()
                .expect("result should be a quantity");
            assert_eq!(joined.values(), &array![1000.0, 2000.0, 500.0].into_dyn());
            assert_eq!(joined.unit(), Some("m"));
        }

        #[test]
        fn plain_data_degrades_the_result() {
            let system = UnitSystem::new();
            let first = sequence(&system, vec![1.0], "m");
            let plain = array![2.0, 3.0].into_dyn();

            let joined = concatenate(&system, &[(&first).into(), (&plain).into()])
                .expect("concatenate should succeed");
            assert_eq!(joined, Evaluated::Numeric(array![1.0, 2.0, 3.0].into_dyn()));
        }

        #[test]
        fn different_dimensions() {
            let system = UnitSystem::new();
            let first = sequence(&system, vec![1.0], "m");
            let second = sequence(&system, vec![1.0], "s");

            let error = concatenate(&system, &[(&first).into(), (&second).into()])
                .expect_err("concatenate should fail");
            assert!(matches!(error, UnitError::IncompatibleUnits { .. }));
        }

        #[test]
        fn scalars_cannot_be_joined() {
            let system = UnitSystem::new();
            let first = Quantity::new(&system, 1.0, "m")
                .expect("quantity should be valid");

            let error = concatenate(&system, &[(&first).into(), (&first).into()])
                .expect_err("concatenate should fail");
            assert!(matches!(error, UnitError::ShapeMismatch { .. }));
        }

        #[test]
        fn nothing_to_join() {
            let system = UnitSystem::new();
            assert!(concatenate(&system, &[]).is_err());
        }
    }
}
