//! Elementwise evaluation of operations on quantities
//!
//! Operands are brought into base units first, the values are combined with
//! numpy-style broadcasting, and the result unit comes from
//! [`algebra::propagate`]. The result is finally converted to the requested
//! target, `auto` by default.

use ndarray::{ArrayD, Zip, arr0, arr1};
use num_rational::Rational64;
use tracing::trace;

use crate::{
    algebra::{self, Operation, Propagated, ResultUnit, UnitOperand},
    error::UnitError,
    quantity::Quantity,
    signature::Signature,
    system::UnitSystem,
    table::{AUTO, CELSIUS_OFFSET, ZERO_SENTINEL, is_celsius},
    util::all_zero,
};

/// An operand of an operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// A quantity
    Quantity(&'a Quantity),
    /// A bare, dimensionless number
    Number(f64),
    /// Plain numeric data without a unit
    Array(&'a ArrayD<f64>),
}

impl<'a> From<&'a Quantity> for Operand<'a> {
    fn from(quantity: &'a Quantity) -> Self {
        Self::Quantity(quantity)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<'a> From<&'a ArrayD<f64>> for Operand<'a> {
    fn from(values: &'a ArrayD<f64>) -> Self {
        Self::Array(values)
    }
}

/// How an operation is applied to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Elementwise application
    #[default]
    Call,
    /// Reduction over all elements of a single operand
    Reduce,
    /// Unbuffered in-place application at given indices, not supported
    At,
}

/// The result of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    /// Values with a unit
    Quantity(Quantity),
    /// The result of a comparison or test
    Boolean(ArrayD<bool>),
    /// Values without unit information
    Numeric(ArrayD<f64>),
}

impl Evaluated {
    /// Returns the quantity, if the result is one.
    #[must_use]
    pub fn into_quantity(self) -> Option<Quantity> {
        match self {
            Self::Quantity(quantity) => Some(quantity),
            Self::Boolean(_) | Self::Numeric(_) => None,
        }
    }

    /// Returns the booleans, if the result is a comparison.
    #[must_use]
    pub fn into_boolean(self) -> Option<ArrayD<bool>> {
        match self {
            Self::Boolean(values) => Some(values),
            Self::Quantity(_) | Self::Numeric(_) => None,
        }
    }
}

struct Prepared {
    values: ArrayD<f64>,
    unit: UnitOperand,
}

/// Returns the values of a quantity in base units, with the unit
/// information the algebra needs.
pub(crate) fn base_values(
    system: &UnitSystem,
    quantity: &Quantity,
) -> Result<(ArrayD<f64>, UnitOperand), UnitError> {
    let values = quantity.values();

    match quantity.unit() {
        None => Ok((values.clone(), UnitOperand::Unitless)),
        Some(ZERO_SENTINEL) => Ok((
            ArrayD::zeros(values.raw_dim()),
            UnitOperand::ZeroSentinel,
        )),
        Some(unit) => {
            let parsed = system.parse(unit)?;
            let scale = parsed.scale();
            let offset = if is_celsius(unit) { CELSIUS_OFFSET } else { 0.0 };
            let base = values.mapv(|value| value * scale + offset);
            let zero = base.len() == 1 && all_zero(&base);

            Ok((
                base,
                UnitOperand::Quantity {
                    signature: parsed.signature().clone(),
                    zero,
                },
            ))
        }
    }
}

fn prepare(system: &UnitSystem, operand: Operand<'_>) -> Result<Prepared, UnitError> {
    Ok(match operand {
        Operand::Quantity(quantity) => {
            let (values, unit) = base_values(system, quantity)?;
            Prepared { values, unit }
        }
        Operand::Number(value) => Prepared {
            values: arr0(value).into_dyn(),
            unit: UnitOperand::Number(value),
        },
        Operand::Array(values) => Prepared {
            values: values.clone(),
            unit: UnitOperand::Plain {
                scalar: (values.len() == 1)
                    .then(|| values.first().copied())
                    .flatten(),
            },
        },
    })
}

/// Applies an operation and converts a quantity result to `target`.
pub(crate) fn evaluate(
    system: &UnitSystem,
    operation: Operation,
    method: Method,
    operands: &[Operand<'_>],
    target: &str,
) -> Result<Evaluated, UnitError> {
    trace!(%operation, ?method, operands = operands.len(), "applying operation");

    match method {
        Method::Call => call(system, operation, operands, target),
        Method::Reduce => reduce(system, operation, operands, target).map(Evaluated::Quantity),
        Method::At => Err(UnitError::unsupported(format!("{operation}.at"))),
    }
}

/// Applies an operation and writes the result into `out`, converted to the
/// target of `out`.
pub(crate) fn evaluate_into(
    system: &UnitSystem,
    operation: Operation,
    operands: &[Operand<'_>],
    out: &mut Quantity,
) -> Result<(), UnitError> {
    let target = out.target().to_owned();
    let Evaluated::Quantity(result) = call(system, operation, operands, &target)? else {
        return Err(UnitError::unsupported(format!(
            "{operation} into a quantity"
        )));
    };

    if result.shape() != out.shape() {
        return Err(UnitError::ShapeMismatch {
            left: out.shape().to_vec(),
            right: result.shape().to_vec(),
        });
    }

    let unit = result.unit().map(str::to_owned);
    out.replace(result.into_values(), unit);
    Ok(())
}

fn call(
    system: &UnitSystem,
    operation: Operation,
    operands: &[Operand<'_>],
    target: &str,
) -> Result<Evaluated, UnitError> {
    let prepared = operands
        .iter()
        .map(|operand| prepare(system, *operand))
        .collect::<Result<Vec<_>, _>>()?;
    let units: Vec<_> = prepared
        .iter()
        .map(|operand| operand.unit.clone())
        .collect();

    match algebra::propagate(operation, &units)? {
        Propagated::Boolean { comparable } => {
            compare(operation, &prepared, comparable).map(Evaluated::Boolean)
        }
        Propagated::Unit(unit) => {
            let values = compute(operation, &prepared)?;
            finish(system, values, unit, target).map(Evaluated::Quantity)
        }
    }
}

fn compute(operation: Operation, prepared: &[Prepared]) -> Result<ArrayD<f64>, UnitError> {
    let first = &prepared[0].values;
    let second = || &prepared[1].values;

    Ok(match operation {
        Operation::Add => broadcast_with(first, second(), |a, b| a + b)?,
        Operation::Subtract => broadcast_with(first, second(), |a, b| a - b)?,
        Operation::Multiply => broadcast_with(first, second(), |a, b| a * b)?,
        Operation::Divide | Operation::TrueDivide => broadcast_with(first, second(), |a, b| a / b)?,
        Operation::Power => broadcast_with(first, second(), f64::powf)?,
        Operation::Minimum => broadcast_with(first, second(), f64::min)?,
        Operation::Maximum => broadcast_with(first, second(), f64::max)?,
        Operation::Negative => first.mapv(|value| -value),
        Operation::Positive | Operation::Conjugate => first.clone(),
        Operation::Absolute | Operation::Fabs => first.mapv(f64::abs),
        Operation::Square => first.mapv(|value| value * value),
        Operation::Sqrt => first.mapv(f64::sqrt),
        Operation::Equal
        | Operation::NotEqual
        | Operation::Less
        | Operation::LessEqual
        | Operation::Greater
        | Operation::GreaterEqual
        | Operation::IsFinite => {
            return Err(UnitError::unsupported(format!(
                "{operation} as a value-producing operation"
            )));
        }
    })
}

#[expect(
    clippy::float_cmp,
    reason = "equality of quantities is exact equality of their base values"
)]
fn compare(
    operation: Operation,
    prepared: &[Prepared],
    comparable: bool,
) -> Result<ArrayD<bool>, UnitError> {
    let first = &prepared[0].values;
    if operation == Operation::IsFinite {
        return Ok(first.mapv(f64::is_finite));
    }
    let second = &prepared[1].values;

    match operation {
        Operation::Equal => broadcast_with(first, second, |a, b| comparable && a == b),
        Operation::NotEqual => broadcast_with(first, second, |a, b| !comparable || a != b),
        Operation::Less => broadcast_with(first, second, |a, b| a < b),
        Operation::LessEqual => broadcast_with(first, second, |a, b| a <= b),
        Operation::Greater => broadcast_with(first, second, |a, b| a > b),
        Operation::GreaterEqual => broadcast_with(first, second, |a, b| a >= b),
        _ => Err(UnitError::unsupported(format!(
            "{operation} as a comparison"
        ))),
    }
}

fn reduce(
    system: &UnitSystem,
    operation: Operation,
    operands: &[Operand<'_>],
    target: &str,
) -> Result<Quantity, UnitError> {
    let [operand] = operands else {
        return Err(UnitError::ArityMismatch {
            operation: format!("{operation}.reduce"),
            expected: 1,
            found: operands.len(),
        });
    };

    let prepared = prepare(system, *operand)?;
    let values = &prepared.values;
    let empty = || UnitError::EmptyReduction {
        operation: operation.name().to_owned(),
    };

    let (value, exponent) = match operation {
        Operation::Add => (values.sum(), Rational64::from_integer(1)),
        Operation::Multiply => {
            let count = i64::try_from(values.len())
                .map_err(|_| UnitError::unsupported("multiply.reduce of this many values"))?;
            (values.product(), Rational64::from_integer(count))
        }
        Operation::Minimum => (
            values.iter().copied().reduce(f64::min).ok_or_else(empty)?,
            Rational64::from_integer(1),
        ),
        Operation::Maximum => (
            values.iter().copied().reduce(f64::max).ok_or_else(empty)?,
            Rational64::from_integer(1),
        ),
        _ => return Err(UnitError::unsupported(format!("{operation}.reduce"))),
    };

    let unit = match &prepared.unit {
        UnitOperand::Quantity { signature, .. } => ResultUnit::Signature(
            signature
                .checked_pow(exponent)
                .ok_or_else(|| UnitError::exponent_overflow(&format!("{operation}.reduce")))?,
        ),
        UnitOperand::Number(_) => ResultUnit::Signature(Signature::dimensionless()),
        UnitOperand::ZeroSentinel => ResultUnit::ZeroSentinel,
        UnitOperand::Unitless | UnitOperand::Plain { .. } => ResultUnit::Unitless,
    };

    finish(system, arr0(value).into_dyn(), unit, target)
}

/// Wraps base-unit values as a quantity and converts it to `target`.
fn finish(
    system: &UnitSystem,
    values: ArrayD<f64>,
    unit: ResultUnit,
    target: &str,
) -> Result<Quantity, UnitError> {
    let unit = match unit {
        ResultUnit::Signature(signature) => Some(signature.to_string()),
        ResultUnit::ZeroSentinel => Some(ZERO_SENTINEL.to_owned()),
        ResultUnit::Unitless => None,
    };

    let mut quantity = Quantity::from_parts(values, unit, AUTO);
    quantity.to(system, target)?;
    Ok(quantity)
}

/// Combines two arrays elementwise after broadcasting them to a common
/// shape.
///
/// # Errors
///
/// Returns [`UnitError::ShapeMismatch`] if the shapes are incompatible.
pub fn broadcast_with<T>(
    lhs: &ArrayD<f64>,
    rhs: &ArrayD<f64>,
    combine: impl Fn(f64, f64) -> T,
) -> Result<ArrayD<T>, UnitError> {
    let mismatch = || UnitError::ShapeMismatch {
        left: lhs.shape().to_vec(),
        right: rhs.shape().to_vec(),
    };

    let shape = broadcast_shape(lhs.shape(), rhs.shape())
        .ok_or_else(mismatch)?;
    let (Some(lhs), Some(rhs)) = (lhs.broadcast(shape.as_slice()), rhs.broadcast(shape.as_slice()))
    else {
        return Err(mismatch());
    };

    Ok(Zip::from(&lhs).and(&rhs).map_collect(|&a, &b| combine(a, b)))
}

/// Returns the shape two shapes broadcast to, aligning trailing axes.
fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Option<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let axis_len = |shape: &[usize], axis: usize| {
        let offset = ndim - shape.len();
        if axis < offset { 1 } else { shape[axis - offset] }
    };

    (0..ndim)
        .map(|axis| match (axis_len(lhs, axis), axis_len(rhs, axis)) {
            (a, b) if a == b => Some(a),
            (1, b) => Some(b),
            (a, 1) => Some(a),
            _ => None,
        })
        .collect()
}

/// Wraps a single number as a one-element, one-dimensional array.
pub(crate) fn number_as_array(value: f64) -> ArrayD<f64> {
    arr1(&[value]).into_dyn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn quantity(system: &UnitSystem, value: f64, unit: &str) -> Quantity {
        Quantity::new(system, value, unit).expect("quantity should be valid")
    }

    fn scalar_of(evaluated: Evaluated) -> (f64, Option<String>) {
        let quantity = evaluated
            .into_quantity()
            .expect("result should be a quantity");
        (
            quantity.value().expect("result should be a scalar"),
            quantity.unit().map(str::to_owned),
        )
    }

    #[test]
    fn broadcast_shapes() {
        assert_eq!(broadcast_shape(&[3], &[]), Some(vec![3]));
        assert_eq!(broadcast_shape(&[3, 1], &[4]), Some(vec![3, 4]));
        assert_eq!(broadcast_shape(&[2], &[3]), None);
    }

    #[test]
    fn addition_in_base_units() {
        let system = UnitSystem::new();
        let a = quantity(&system, 1.0, "km");
        let b = Quantity::with_target(&system, 500.0, "m", "m")
            .expect("quantity should be valid");

        let (value, unit) = scalar_of(
            evaluate(&system, Operation::Add, Method::Call, &[(&a).into(), (&b).into()], AUTO)
                .expect("add should succeed"),
        );
        assert_relative_eq!(value, 1500.0);
        assert_eq!(unit.as_deref(), Some("m"));
    }

    #[test]
    fn explicit_target() {
        let system = UnitSystem::new();
        let a = quantity(&system, 1.0, "km");
        let b = quantity(&system, 500.0, "m");

        let (value, unit) = scalar_of(
            evaluate(&system, Operation::Add, Method::Call, &[(&a).into(), (&b).into()], "km")
                .expect("add should succeed"),
        );
        assert_relative_eq!(value, 1.5);
        assert_eq!(unit.as_deref(), Some("km"));
    }

    #[test]
    fn arrays_broadcast_against_scalars() {
        let system = UnitSystem::new();
        let lengths = Quantity::new(&system, vec![1.0, 2.0, 3.0], "m")
            .expect("quantity should be valid");
        let factor = quantity(&system, 2.0, "s");

        let product = evaluate(
            &system,
            Operation::Multiply,
            Method::Call,
            &[(&lengths).into(), (&factor).into()],
            AUTO,
        )
        .expect("multiply should succeed")
        .into_quantity()
        .expect("result should be a quantity");

        assert_eq!(product.values(), &array![2.0, 4.0, 6.0].into_dyn());
        assert_eq!(product.unit(), Some("m*s"));
    }

    #[test]
    fn incompatible_shapes() {
        let system = UnitSystem::new();
        let a = Quantity::new(&system, vec![1.0, 2.0], "m")
            .expect("quantity should be valid");
        let b = Quantity::new(&system, vec![1.0, 2.0, 3.0], "m")
            .expect("quantity should be valid");

        let error =
            evaluate(&system, Operation::Add, Method::Call, &[(&a).into(), (&b).into()], AUTO)
                .expect_err("add should fail");
        assert_eq!(
            error,
            UnitError::ShapeMismatch {
                left: vec![2],
                right: vec![3],
            }
        );
    }

    #[test]
    fn equality_across_dimensions_is_false() {
        let system = UnitSystem::new();
        let a = quantity(&system, 1.0, "m");
        let b = quantity(&system, 1.0, "s");

        let equal =
            evaluate(&system, Operation::Equal, Method::Call, &[(&a).into(), (&b).into()], AUTO)
                .expect("equal should succeed")
                .into_boolean()
                .expect("result should be boolean");
        assert_eq!(equal, arr0(false).into_dyn());

        let not_equal =
            evaluate(&system, Operation::NotEqual, Method::Call, &[(&a).into(), (&b).into()], AUTO)
                .expect("not_equal should succeed")
                .into_boolean()
                .expect("result should be boolean");
        assert_eq!(not_equal, arr0(true).into_dyn());
    }

    #[test]
    fn celsius_operands_are_shifted() {
        let system = UnitSystem::new();
        let celsius = Quantity::with_target(&system, 25.0, "°C", "°C")
            .expect("quantity should be valid");
        let equal_to = |kelvin: f64| {
            let kelvin = quantity(&system, kelvin, "K");
            evaluate(
                &system,
                Operation::Equal,
                Method::Call,
                &[(&celsius).into(), (&kelvin).into()],
                AUTO,
            )
            .expect("comparison should succeed")
            .into_boolean()
            .expect("result should be boolean")
        };

        assert_eq!(equal_to(298.15), arr0(true).into_dyn());
        assert_eq!(equal_to(298.16), arr0(false).into_dyn());
        assert_eq!(equal_to(25.0), arr0(false).into_dyn());
    }

    #[test]
    fn reductions() {
        let system = UnitSystem::new();
        let lengths = Quantity::new(&system, vec![1.0, 2.0, 3.0], "m")
            .expect("quantity should be valid");

        let (sum, unit) = scalar_of(
            evaluate(&system, Operation::Add, Method::Reduce, &[(&lengths).into()], AUTO)
                .expect("sum should succeed"),
        );
        assert_relative_eq!(sum, 6.0);
        assert_eq!(unit.as_deref(), Some("m"));

        let (product, unit) = scalar_of(
            evaluate(&system, Operation::Multiply, Method::Reduce, &[(&lengths).into()], AUTO)
                .expect("product should succeed"),
        );
        assert_relative_eq!(product, 6.0);
        assert_eq!(unit.as_deref(), Some("m**3"));

        let (maximum, _) = scalar_of(
            evaluate(&system, Operation::Maximum, Method::Reduce, &[(&lengths).into()], AUTO)
                .expect("maximum should succeed"),
        );
        assert_relative_eq!(maximum, 3.0);
    }

    #[test]
    fn at_is_unsupported() {
        let system = UnitSystem::new();
        let a = quantity(&system, 1.0, "m");
        let error = evaluate(&system, Operation::Add, Method::At, &[(&a).into(), (&a).into()], AUTO)
            .expect_err("at should fail");
        assert_eq!(
            error,
            UnitError::UnsupportedOperation {
                operation: "add.at".to_owned(),
            }
        );
    }

    #[test]
    fn write_into_an_output_quantity() {
        let system = UnitSystem::new();
        let a = quantity(&system, 1.0, "m");
        let b = quantity(&system, 2.0, "m");
        let mut out = Quantity::with_target(&system, 0.0, "mm", "mm")
            .expect("quantity should be valid");

        evaluate_into(&system, Operation::Add, &[(&a).into(), (&b).into()], &mut out)
            .expect("add should succeed");
        assert_relative_eq!(out.value().expect("scalar"), 3000.0);
        assert_eq!(out.unit(), Some("mm"));
    }
}
