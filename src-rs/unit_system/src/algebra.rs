//! Signature propagation through operations
//!
//! Given the signatures of the operands of an operation, the rules here
//! decide whether the operation is dimensionally valid and what the
//! signature of its result is. Values are not touched.
//!
//! A zero operand is a wildcard: `0 + 3 m` is `3 m`, whatever the unit of
//! the zero.

use std::{fmt, str::FromStr};

use num_rational::Rational64;

use crate::{error::UnitError, signature::Signature};

/// An operation that can be applied to quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Elementwise sum
    Add,
    /// Elementwise difference
    Subtract,
    /// Elementwise product
    Multiply,
    /// Elementwise quotient
    Divide,
    /// Elementwise quotient, an alias of [`Operation::Divide`]
    TrueDivide,
    /// Negation
    Negative,
    /// Identity
    Positive,
    /// Absolute value
    Absolute,
    /// Absolute value of a float
    Fabs,
    /// Complex conjugate, the identity on real values
    Conjugate,
    /// Square
    Square,
    /// Power with a numeric exponent
    Power,
    /// Square root
    Sqrt,
    /// Elementwise minimum
    Minimum,
    /// Elementwise maximum
    Maximum,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// Finiteness test
    IsFinite,
}

impl Operation {
    /// Every supported operation.
    pub const ALL: [Self; 22] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::TrueDivide,
        Self::Negative,
        Self::Positive,
        Self::Absolute,
        Self::Fabs,
        Self::Conjugate,
        Self::Square,
        Self::Power,
        Self::Sqrt,
        Self::Minimum,
        Self::Maximum,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
        Self::IsFinite,
    ];

    /// Returns the operation name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::TrueDivide => "true_divide",
            Self::Negative => "negative",
            Self::Positive => "positive",
            Self::Absolute => "absolute",
            Self::Fabs => "fabs",
            Self::Conjugate => "conjugate",
            Self::Square => "square",
            Self::Power => "power",
            Self::Sqrt => "sqrt",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::Less => "less",
            Self::LessEqual => "less_equal",
            Self::Greater => "greater",
            Self::GreaterEqual => "greater_equal",
            Self::IsFinite => "isfinite",
        }
    }

    /// Returns the number of operands the operation takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Negative
            | Self::Positive
            | Self::Absolute
            | Self::Fabs
            | Self::Conjugate
            | Self::Square
            | Self::Sqrt
            | Self::IsFinite => 1,
            _ => 2,
        }
    }

    /// Returns `true` if the operation produces booleans.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
                | Self::IsFinite
        )
    }

    fn check_arity(self, found: usize) -> Result<(), UnitError> {
        if found == self.arity() {
            Ok(())
        } else {
            Err(UnitError::ArityMismatch {
                operation: self.name().to_owned(),
                expected: self.arity(),
                found,
            })
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = UnitError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.name() == name)
            .ok_or_else(|| UnitError::unsupported(name))
    }
}

/// The unit information of one operand.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOperand {
    /// A quantity with a parsed unit. `zero` marks a scalar zero value.
    Quantity {
        /// The signature of the unit
        signature: Signature,
        /// Whether the value is a scalar zero
        zero: bool,
    },
    /// A quantity whose unit is the zero sentinel `"0"`.
    ZeroSentinel,
    /// A quantity without a unit.
    Unitless,
    /// A bare number, which is dimensionless.
    Number(f64),
    /// Plain numeric data without unit information. `scalar` holds the
    /// value when the data has exactly one element.
    Plain {
        /// The single value, if there is exactly one
        scalar: Option<f64>,
    },
}

impl UnitOperand {
    /// Returns the signature the operand constrains the result with.
    fn signature(&self) -> Option<Signature> {
        match self {
            Self::Quantity { signature, .. } => Some(signature.clone()),
            Self::Number(_) => Some(Signature::dimensionless()),
            Self::ZeroSentinel | Self::Unitless | Self::Plain { .. } => None,
        }
    }

    /// Returns `true` if the operand is a zero wildcard.
    fn is_zero(&self) -> bool {
        match self {
            Self::Quantity { zero, .. } => *zero,
            Self::ZeroSentinel => true,
            Self::Number(value) => *value == 0.0,
            Self::Unitless | Self::Plain { .. } => false,
        }
    }
}

/// The unit of the result of a value-producing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultUnit {
    /// A quantity with this signature
    Signature(Signature),
    /// A zero that is compatible with every unit
    ZeroSentinel,
    /// A quantity without a unit
    Unitless,
}

impl ResultUnit {
    fn from_signature(signature: Option<Signature>) -> Self {
        signature.map_or(Self::Unitless, Self::Signature)
    }
}

/// The result of propagating signatures through an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagated {
    /// The operation produces values in this unit
    Unit(ResultUnit),
    /// The operation produces booleans. `comparable` is `false` when an
    /// equality test compares different dimensions, which makes every
    /// element unequal.
    Boolean {
        /// Whether the operands share dimensions
        comparable: bool,
    },
}

/// Propagates operand signatures through an operation.
///
/// # Errors
///
/// Returns an error if the number of operands does not match the operation,
/// if additive operations or orderings get operands of different
/// dimensions, or if a power has a quantity or non-rational exponent.
pub fn propagate(operation: Operation, operands: &[UnitOperand]) -> Result<Propagated, UnitError> {
    operation.check_arity(operands.len())?;

    let unit = match operation {
        Operation::Add | Operation::Subtract | Operation::Minimum | Operation::Maximum => {
            shared_signature(operation, operands)?
        }
        Operation::Multiply => {
            if operands.iter().any(UnitOperand::is_zero) {
                ResultUnit::ZeroSentinel
            } else {
                product(operation, operands.iter().map(UnitOperand::signature))?
            }
        }
        Operation::Divide | Operation::TrueDivide => {
            if operands[0].is_zero() {
                ResultUnit::ZeroSentinel
            } else {
                product(
                    operation,
                    [
                        operands[0].signature(),
                        operands[1].signature().as_ref().map(Signature::recip),
                    ],
                )?
            }
        }
        Operation::Power => power(&operands[0], &operands[1])?,
        Operation::Square => raise(operation, &operands[0], Rational64::from_integer(2))?,
        Operation::Sqrt => raise(operation, &operands[0], Rational64::new(1, 2))?,
        Operation::Negative
        | Operation::Positive
        | Operation::Absolute
        | Operation::Fabs
        | Operation::Conjugate => raise(operation, &operands[0], Rational64::from_integer(1))?,
        Operation::Equal | Operation::NotEqual => {
            return Ok(Propagated::Boolean {
                comparable: comparable(operands),
            });
        }
        Operation::Less | Operation::LessEqual | Operation::Greater | Operation::GreaterEqual => {
            ordered(operation, operands)?;
            return Ok(Propagated::Boolean { comparable: true });
        }
        Operation::IsFinite => return Ok(Propagated::Boolean { comparable: true }),
    };

    Ok(Propagated::Unit(unit))
}

/// Returns the signature shared by all non-zero operands of an additive
/// operation.
fn shared_signature(
    operation: Operation,
    operands: &[UnitOperand],
) -> Result<ResultUnit, UnitError> {
    let mut shared: Option<Signature> = None;
    for signature in operands
        .iter()
        .filter(|operand| !operand.is_zero())
        .filter_map(UnitOperand::signature)
    {
        match &shared {
            None => shared = Some(signature),
            Some(expected) if *expected == signature => {}
            Some(expected) => {
                return Err(UnitError::IncompatibleUnits {
                    operation: operation.name().to_owned(),
                    expected: expected.to_string(),
                    found: signature.to_string(),
                });
            }
        }
    }

    if shared.is_some() {
        return Ok(ResultUnit::from_signature(shared));
    }

    // only zeros: keep their unit if they agree on one
    let mut zero_signatures = operands.iter().filter_map(|operand| match operand {
        UnitOperand::Quantity { signature, .. } => Some(signature),
        _ => None,
    });
    let Some(first) = zero_signatures.next() else {
        return Ok(ResultUnit::Unitless);
    };
    let all_agree = zero_signatures.all(|signature| signature == first)
        && !operands
            .iter()
            .any(|operand| matches!(operand, UnitOperand::ZeroSentinel));

    Ok(if all_agree {
        ResultUnit::Signature(first.clone())
    } else {
        ResultUnit::Unitless
    })
}

fn product(
    operation: Operation,
    signatures: impl IntoIterator<Item = Option<Signature>>,
) -> Result<ResultUnit, UnitError> {
    let mut product: Option<Signature> = None;
    for signature in signatures.into_iter().flatten() {
        product = Some(match product {
            Some(lhs) => lhs
                .checked_mul(&signature)
                .ok_or_else(|| UnitError::exponent_overflow(operation.name()))?,
            None => signature,
        });
    }
    Ok(ResultUnit::from_signature(product))
}

fn raise(
    operation: Operation,
    operand: &UnitOperand,
    exponent: Rational64,
) -> Result<ResultUnit, UnitError> {
    match operand {
        UnitOperand::ZeroSentinel => Ok(ResultUnit::ZeroSentinel),
        other => other
            .signature()
            .map(|signature| {
                signature
                    .checked_pow(exponent)
                    .ok_or_else(|| UnitError::exponent_overflow(operation.name()))
            })
            .transpose()
            .map(ResultUnit::from_signature),
    }
}

fn power(base: &UnitOperand, exponent: &UnitOperand) -> Result<ResultUnit, UnitError> {
    let exponent = match exponent {
        UnitOperand::Quantity { .. } | UnitOperand::ZeroSentinel | UnitOperand::Unitless => {
            return Err(UnitError::invalid_exponent(
                "a quantity cannot be used as an exponent",
            ));
        }
        UnitOperand::Number(value) | UnitOperand::Plain { scalar: Some(value) } => *value,
        UnitOperand::Plain { scalar: None } => {
            return match base.signature() {
                Some(signature) if !signature.is_dimensionless() => {
                    Err(UnitError::invalid_exponent(
                        "a dimensioned base needs a single exponent",
                    ))
                }
                _ => raise(Operation::Power, base, Rational64::from_integer(1)),
            };
        }
    };

    let rational = Rational64::approximate_float(exponent).ok_or_else(|| {
        UnitError::invalid_exponent(format!("{exponent} is not a representable power"))
    })?;

    raise(Operation::Power, base, rational)
}

/// Returns `true` if all non-zero operands share a signature.
fn comparable(operands: &[UnitOperand]) -> bool {
    let mut signatures = operands
        .iter()
        .filter(|operand| !operand.is_zero())
        .filter_map(UnitOperand::signature);

    signatures
        .next()
        .is_none_or(|first| signatures.all(|signature| signature == first))
}

/// Checks that all operands of an ordering share a signature.
fn ordered(operation: Operation, operands: &[UnitOperand]) -> Result<(), UnitError> {
    let mut signatures = operands.iter().filter_map(UnitOperand::signature);
    let Some(first) = signatures.next() else {
        return Ok(());
    };

    for signature in signatures {
        if signature != first {
            return Err(UnitError::IncompatibleUnits {
                operation: operation.name().to_owned(),
                expected: first.to_string(),
                found: signature.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::UnitParser;
    use rstest::rstest;

    fn signature(unit: &str) -> Signature {
        UnitParser::default()
            .parse(unit)
            .expect("unit should parse")
            .signature()
            .clone()
    }

    fn quantity(unit: &str) -> UnitOperand {
        UnitOperand::Quantity {
            signature: signature(unit),
            zero: false,
        }
    }

    fn zero(unit: &str) -> UnitOperand {
        UnitOperand::Quantity {
            signature: signature(unit),
            zero: true,
        }
    }

    fn unit_of(result: Propagated) -> ResultUnit {
        match result {
            Propagated::Unit(unit) => unit,
            Propagated::Boolean { .. } => panic!("expected a unit result"),
        }
    }

    #[rstest]
    #[case("add")]
    #[case("true_divide")]
    #[case("isfinite")]
    #[case("greater_equal")]
    fn operation_names_round_trip(#[case] name: &str) {
        let operation: Operation = name.parse().expect("name should be known");
        assert_eq!(operation.name(), name);
    }

    #[test]
    fn unknown_operation_name() {
        assert_eq!(
            "arctan2".parse::<Operation>(),
            Err(UnitError::UnsupportedOperation {
                operation: "arctan2".to_owned(),
            })
        );
    }

    mod additive_tests {
        use super::*;

        #[test]
        fn matching_signatures() {
            let result = propagate(Operation::Add, &[quantity("m"), quantity("km")])
                .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m")));
        }

        #[test]
        fn mismatched_signatures() {
            let error = propagate(Operation::Subtract, &[quantity("m"), quantity("s")])
                .expect_err("subtract should fail");
            assert_eq!(
                error,
                UnitError::IncompatibleUnits {
                    operation: "subtract".to_owned(),
                    expected: "m".to_owned(),
                    found: "s".to_owned(),
                }
            );
        }

        #[test]
        fn zeros_are_wildcards() {
            let result = propagate(Operation::Add, &[zero("s"), quantity("m")])
                .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m")));

            let result = propagate(Operation::Add, &[UnitOperand::Number(0.0), quantity("m")])
                .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m")));

            let result = propagate(Operation::Maximum, &[UnitOperand::ZeroSentinel, quantity("V")])
                .expect("maximum should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("V")));
        }

        #[test]
        fn only_zeros() {
            let result = propagate(Operation::Add, &[zero("m"), zero("m")])
                .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m")));

            let result = propagate(Operation::Add, &[zero("m"), zero("s")])
                .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Unitless);

            let result = propagate(
                Operation::Add,
                &[UnitOperand::ZeroSentinel, UnitOperand::ZeroSentinel],
            )
            .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Unitless);
        }

        #[test]
        fn bare_numbers_are_dimensionless() {
            let error = propagate(Operation::Add, &[UnitOperand::Number(1.0), quantity("m")])
                .expect_err("add should fail");
            assert!(matches!(error, UnitError::IncompatibleUnits { .. }));

            let result = propagate(Operation::Add, &[UnitOperand::Number(1.0), quantity("m/km")])
                .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(Signature::dimensionless()));
        }

        #[test]
        fn plain_data_is_unconstrained() {
            let result = propagate(
                Operation::Add,
                &[UnitOperand::Plain { scalar: None }, quantity("m")],
            )
            .expect("add should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m")));
        }
    }

    mod multiplicative_tests {
        use super::*;

        #[test]
        fn product_of_signatures() {
            let result = propagate(Operation::Multiply, &[quantity("kΩ"), quantity("mA")])
                .expect("multiply should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("V")));
        }

        #[test]
        fn quotient_of_signatures() {
            let result = propagate(Operation::TrueDivide, &[quantity("m"), quantity("s")])
                .expect("divide should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m/s")));
        }

        #[test]
        fn zero_factor_gives_the_sentinel() {
            let result = propagate(Operation::Multiply, &[zero("m"), quantity("s")])
                .expect("multiply should succeed");
            assert_eq!(unit_of(result), ResultUnit::ZeroSentinel);

            let result = propagate(Operation::Divide, &[UnitOperand::Number(0.0), quantity("s")])
                .expect("divide should succeed");
            assert_eq!(unit_of(result), ResultUnit::ZeroSentinel);
        }

        #[test]
        fn zero_divisor_keeps_the_quotient() {
            let result = propagate(Operation::Divide, &[quantity("m"), zero("s")])
                .expect("divide should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m/s")));
        }
    }

    mod power_tests {
        use super::*;

        #[test]
        fn numeric_exponents() {
            let result = propagate(Operation::Power, &[quantity("m"), UnitOperand::Number(2.0)])
                .expect("power should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m**2")));

            let result = propagate(Operation::Power, &[quantity("m"), UnitOperand::Number(0.5)])
                .expect("power should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("sqrt(m)")));
        }

        #[test]
        fn quantity_exponent_is_rejected() {
            let error = propagate(Operation::Power, &[quantity("m"), quantity("m/m")])
                .expect_err("power should fail");
            assert!(matches!(error, UnitError::InvalidExponent { .. }));

            let error = propagate(Operation::Power, &[quantity("m"), UnitOperand::Unitless])
                .expect_err("power should fail");
            assert!(matches!(error, UnitError::InvalidExponent { .. }));
        }

        #[test]
        fn square_and_sqrt() {
            let result = propagate(Operation::Square, &[quantity("V")])
                .expect("square should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("V**2")));

            let result = propagate(Operation::Sqrt, &[quantity("m**2")])
                .expect("sqrt should succeed");
            assert_eq!(unit_of(result), ResultUnit::Signature(signature("m")));
        }

        #[test]
        fn exponents_out_of_range_are_errors() {
            let root = quantity("m**(1/2147483647)");

            let other_root = quantity("m**(1/2147483646)");
            let error = propagate(Operation::Multiply, &[root.clone(), other_root])
                .expect_err("multiply should fail");
            assert!(matches!(error, UnitError::InvalidExponent { .. }));

            let error = propagate(Operation::Power, &[root, UnitOperand::Number(1e12)])
                .expect_err("power should fail");
            assert!(matches!(error, UnitError::InvalidExponent { .. }));
        }
    }

    mod comparison_tests {
        use super::*;

        #[test]
        fn equality_of_different_dimensions_is_not_comparable() {
            assert_eq!(
                propagate(Operation::Equal, &[quantity("m"), quantity("s")]),
                Ok(Propagated::Boolean { comparable: false })
            );
            assert_eq!(
                propagate(Operation::NotEqual, &[quantity("m"), quantity("km")]),
                Ok(Propagated::Boolean { comparable: true })
            );
            assert_eq!(
                propagate(Operation::Equal, &[quantity("m"), UnitOperand::Number(0.0)]),
                Ok(Propagated::Boolean { comparable: true })
            );
        }

        #[test]
        fn orderings_require_equal_dimensions() {
            let error = propagate(Operation::Less, &[quantity("m"), quantity("s")])
                .expect_err("less should fail");
            assert!(matches!(error, UnitError::IncompatibleUnits { .. }));

            let error = propagate(Operation::Greater, &[quantity("m"), UnitOperand::Number(0.0)])
                .expect_err("greater should fail");
            assert!(matches!(error, UnitError::IncompatibleUnits { .. }));

            assert_eq!(
                propagate(Operation::LessEqual, &[quantity("m"), zero("km")]),
                Ok(Propagated::Boolean { comparable: true })
            );
        }
    }

    #[test]
    fn arity_is_checked() {
        let error = propagate(Operation::Add, &[quantity("m")])
            .expect_err("add should fail");
        assert_eq!(
            error,
            UnitError::ArityMismatch {
                operation: "add".to_owned(),
                expected: 2,
                found: 1,
            }
        );
    }
}
