//! Reduces a base-unit expression to a scale factor and a signature
//!
//! Every expression the parser accepts is a monomial: a numeric coefficient
//! times a product of symbols raised to rational powers. The coefficient is
//! kept as an exact rational, a power of ten and a power of π for as long as
//! the arithmetic allows, so `1E-3*m` has a scale of exactly `0.001` rather
//! than an accumulation of rounding errors.

use std::f64::consts::PI;

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, One, Zero};

use crate::{
    error::ParseError,
    parser::{ParsedUnit, substitute::RawExpr},
    signature::{Signature, Symbol, bounded_exponent},
};

/// Powers of ten that are exactly representable as `f64`.
const POWERS_OF_TEN: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Integer powers beyond this are not computed exactly.
const MAX_EXACT_POWER: u64 = 64;

/// Reduces a raw expression to its scale and signature.
///
/// # Errors
///
/// Returns [`ParseError::ZeroScale`] if the scale is zero, negative or not
/// finite, [`ParseError::ExponentOverflow`] if an exponent leaves the range
/// that can be tracked exactly, and a syntax error if a numeric literal
/// cannot be read.
pub fn canonicalize(expression: &str, raw: &RawExpr) -> Result<ParsedUnit, ParseError> {
    let monomial = evaluate(expression, raw)?;
    let scale = monomial.coefficient.value();

    if !(scale > 0.0 && scale.is_finite()) {
        return Err(ParseError::ZeroScale {
            expression: expression.to_owned(),
        });
    }

    Ok(ParsedUnit::new(scale, monomial.signature))
}

fn evaluate(expression: &str, raw: &RawExpr) -> Result<Monomial, ParseError> {
    let monomial = match raw {
        RawExpr::Number(literal) => Some(Monomial {
            coefficient: Coefficient::from_literal(expression, literal)?,
            signature: Signature::dimensionless(),
        }),
        RawExpr::Base(unit) => Monomial::symbol(Symbol::Base(*unit)),
        RawExpr::Opaque(name) => Monomial::symbol(Symbol::Opaque(name.clone())),
        RawExpr::Pi => Some(Monomial {
            coefficient: Coefficient {
                pi: Rational64::one(),
                ..Coefficient::ONE
            },
            signature: Signature::dimensionless(),
        }),
        RawExpr::Group(inner) => Some(evaluate(expression, inner)?),
        RawExpr::Sqrt(inner) => evaluate(expression, inner)?.pow(Rational64::new(1, 2)),
        RawExpr::Multiply(lhs, rhs) => {
            evaluate(expression, lhs)?.multiply(&evaluate(expression, rhs)?)
        }
        RawExpr::Divide(lhs, rhs) => {
            evaluate(expression, lhs)?.divide(&evaluate(expression, rhs)?)
        }
        RawExpr::Power(base, exponent) => evaluate(expression, base)?.pow(exponent.value()),
    };

    monomial.ok_or_else(|| overflow(expression))
}

fn overflow(expression: &str) -> ParseError {
    ParseError::ExponentOverflow {
        expression: expression.to_owned(),
    }
}

/// Adds two exponents, keeping the result in range.
fn add(lhs: Rational64, rhs: Rational64) -> Option<Rational64> {
    bounded_exponent(lhs.checked_add(&rhs)?)
}

/// Multiplies two exponents, keeping the result in range.
fn mul(lhs: Rational64, rhs: Rational64) -> Option<Rational64> {
    bounded_exponent(lhs.checked_mul(&rhs)?)
}

struct Monomial {
    coefficient: Coefficient,
    signature: Signature,
}

impl Monomial {
    fn symbol(symbol: Symbol) -> Option<Self> {
        Some(Self {
            coefficient: Coefficient::ONE,
            signature: Signature::from_factors([(symbol, Rational64::one())])?,
        })
    }

    fn multiply(&self, rhs: &Self) -> Option<Self> {
        Some(Self {
            coefficient: self.coefficient.multiply(rhs.coefficient)?,
            signature: self.signature.checked_mul(&rhs.signature)?,
        })
    }

    fn divide(&self, rhs: &Self) -> Option<Self> {
        Some(Self {
            coefficient: self.coefficient.divide(rhs.coefficient)?,
            signature: self.signature.checked_div(&rhs.signature)?,
        })
    }

    fn pow(&self, exponent: Rational64) -> Option<Self> {
        let exponent = bounded_exponent(exponent)?;
        Some(Self {
            coefficient: self.coefficient.pow(exponent)?,
            signature: self.signature.checked_pow(exponent)?,
        })
    }
}

/// `exact * inexact * 10**decade * pi**pi`
///
/// `decade` and `pi` stay within the exponent range of a signature.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficient {
    exact: Rational64,
    inexact: f64,
    decade: Rational64,
    pi: Rational64,
}

impl Coefficient {
    const ONE: Self = Self {
        exact: Rational64::new_raw(1, 1),
        inexact: 1.0,
        decade: Rational64::new_raw(0, 1),
        pi: Rational64::new_raw(0, 1),
    };

    /// Reads a literal such as `3600`, `2.54e-2` or `1E-3`.
    ///
    /// Trailing zeros of the significand move into the power of ten, so
    /// `1000` is `1 * 10**3`.
    fn from_literal(expression: &str, literal: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::Syntax {
            expression: expression.to_owned(),
            offset: 0,
            expected: format!("a numeric literal instead of `{literal}`"),
        };

        let (mantissa, exponent) = match literal.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => {
                let digits = exponent.trim_start_matches(['+', '-']);
                if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
                    return Err(malformed());
                }
                // well-formed digits only fail to parse when out of range
                (mantissa, exponent.parse::<i64>().map_err(|_| overflow(expression))?)
            }
            None => (literal, 0),
        };
        let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        let digits = format!("{integer}{fraction}");
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self {
                exact: Rational64::zero(),
                ..Self::ONE
            });
        }

        let significant = digits.trim_end_matches('0');
        let trailing_zeros = i64::try_from(digits.len() - significant.len())
            .map_err(|_| overflow(expression))?;
        let fraction_digits = i64::try_from(fraction.len())
            .map_err(|_| overflow(expression))?;
        let decade = exponent
            .checked_sub(fraction_digits)
            .and_then(|decade| decade.checked_add(trailing_zeros))
            .and_then(|decade| bounded_exponent(Rational64::from_integer(decade)))
            .ok_or_else(|| overflow(expression))?;

        Ok(match significant.parse::<i64>() {
            Ok(value) => Self {
                exact: Rational64::from_integer(value),
                decade,
                ..Self::ONE
            },
            Err(_) => Self {
                inexact: significant.parse().map_err(|_| malformed())?,
                decade,
                ..Self::ONE
            },
        })
    }

    fn multiply(self, rhs: Self) -> Option<Self> {
        let (exact, inexact) = match self.exact.checked_mul(&rhs.exact) {
            Some(exact) => (exact, self.inexact * rhs.inexact),
            None => (
                Rational64::one(),
                self.inexact * ratio_to_f64(self.exact) * rhs.inexact * ratio_to_f64(rhs.exact),
            ),
        };

        Some(Self {
            exact,
            inexact,
            decade: add(self.decade, rhs.decade)?,
            pi: add(self.pi, rhs.pi)?,
        })
    }

    fn divide(self, rhs: Self) -> Option<Self> {
        let (exact, inexact) = match self.exact.checked_div(&rhs.exact) {
            Some(exact) => (exact, self.inexact / rhs.inexact),
            None => (
                Rational64::one(),
                self.inexact * ratio_to_f64(self.exact) / (rhs.inexact * ratio_to_f64(rhs.exact)),
            ),
        };

        Some(Self {
            exact,
            inexact,
            decade: add(self.decade, -rhs.decade)?,
            pi: add(self.pi, -rhs.pi)?,
        })
    }

    fn pow(self, exponent: Rational64) -> Option<Self> {
        let (exact, inexact) = if exponent.is_integer() {
            let power = exponent.to_integer();
            match checked_pow(self.exact, power) {
                Some(exact) => (exact, powi(self.inexact, power)),
                None => (
                    Rational64::one(),
                    powi(self.inexact * ratio_to_f64(self.exact), power),
                ),
            }
        } else {
            (
                Rational64::one(),
                (self.inexact * ratio_to_f64(self.exact)).powf(ratio_to_f64(exponent)),
            )
        };

        Some(Self {
            exact,
            inexact,
            decade: mul(self.decade, exponent)?,
            pi: mul(self.pi, exponent)?,
        })
    }

    /// Evaluates the coefficient with as few roundings as possible: the
    /// numerator and denominator are formed separately and divided once.
    fn value(&self) -> f64 {
        let mut numerator = int_to_f64(*self.exact.numer()) * self.inexact;
        let mut denominator = int_to_f64(*self.exact.denom());

        if !self.pi.is_zero() {
            numerator *= if self.pi.is_integer() {
                powi(PI, self.pi.to_integer())
            } else {
                PI.powf(ratio_to_f64(self.pi))
            };
        }

        if self.decade.is_integer() {
            let decade = self.decade.to_integer();
            if decade >= 0 {
                numerator *= power_of_ten(decade.unsigned_abs());
            } else {
                denominator *= power_of_ten(decade.unsigned_abs());
            }
        } else {
            numerator *= 10_f64.powf(ratio_to_f64(self.decade));
        }

        numerator / denominator
    }
}

fn checked_pow(base: Rational64, power: i64) -> Option<Rational64> {
    let magnitude = power.unsigned_abs();
    if magnitude > MAX_EXACT_POWER {
        return None;
    }

    let mut result = Rational64::one();
    for _ in 0..magnitude {
        result = result.checked_mul(&base)?;
    }

    if power < 0 {
        if result.is_zero() || *result.numer() == i64::MIN {
            return None;
        }
        result = result.recip();
    }
    Some(result)
}

fn power_of_ten(power: u64) -> f64 {
    usize::try_from(power)
        .ok()
        .and_then(|index| POWERS_OF_TEN.get(index).copied())
        .unwrap_or_else(|| 10_f64.powf(int_to_f64(i64::try_from(power).unwrap_or(i64::MAX))))
}

fn powi(base: f64, power: i64) -> f64 {
    match i32::try_from(power) {
        Ok(power) => base.powi(power),
        Err(_) => base.powf(int_to_f64(power)),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integers beyond 2**53 only occur in coefficients that are already inexact"
)]
const fn int_to_f64(value: i64) -> f64 {
    value as f64
}

fn ratio_to_f64(ratio: Rational64) -> f64 {
    int_to_f64(*ratio.numer()) / int_to_f64(*ratio.denom())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::substitute::parse_base_expression;
    use approx::assert_relative_eq;

    fn scale_of(expression: &str) -> f64 {
        let raw = parse_base_expression(expression)
            .expect("expression should parse");
        canonicalize(expression, &raw)
            .expect("expression should canonicalize")
            .scale()
    }

    #[test]
    fn literal_trailing_zeros_become_decades() {
        let coefficient = Coefficient::from_literal("", "1000")
            .expect("literal should parse");
        assert_eq!(coefficient.exact, Rational64::one());
        assert_eq!(coefficient.decade, Rational64::from_integer(3));

        let coefficient = Coefficient::from_literal("", "2.54e-2")
            .expect("literal should parse");
        assert_eq!(coefficient.exact, Rational64::from_integer(254));
        assert_eq!(coefficient.decade, Rational64::from_integer(-4));
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "prefix scales are exact")]
    fn decimal_scales_are_exact() {
        assert_eq!(scale_of("1E-3*m"), 0.001);
        assert_eq!(scale_of("m/(1E3)"), 0.001);
        assert_eq!(scale_of("kg/1000"), 0.001);
        assert_eq!(scale_of("1E-3*kg/1000"), 1e-6);
        assert_eq!(scale_of("10**-3*m**3"), 0.001);
        assert_eq!(scale_of("10**4*m**2"), 10_000.0);
        assert_eq!(scale_of("(1E3*m)**2"), 1e6);
        assert_eq!(scale_of("2.54e-2*m"), 0.0254);
        assert_eq!(scale_of("3600*s"), 3600.0);
    }

    #[test]
    fn pi_is_folded_into_the_scale() {
        assert_relative_eq!(scale_of("pi/180"), PI / 180.0);
        assert_relative_eq!(scale_of("pi/648000"), PI / 648_000.0);
        assert_relative_eq!(scale_of("sqrt(pi)"), PI.sqrt());
    }

    #[test]
    fn fractional_powers_of_numbers() {
        assert_relative_eq!(scale_of("4**(1/2)*m"), 2.0);
        assert_relative_eq!(scale_of("sqrt(1E4*m)"), 100.0);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let raw = parse_base_expression("0*m")
            .expect("expression should parse");
        assert_eq!(
            canonicalize("0*m", &raw),
            Err(ParseError::ZeroScale {
                expression: "0*m".to_owned(),
            })
        );

        let raw = parse_base_expression("m/0")
            .expect("expression should parse");
        assert!(canonicalize("m/0", &raw).is_err());
    }

    #[test]
    fn signatures_cancel() {
        let raw = parse_base_expression("m*kg*s**-2/(m*kg)")
            .expect("expression should parse");
        let parsed = canonicalize("", &raw)
            .expect("expression should canonicalize");
        assert_eq!(parsed.signature().to_string(), "s**-2");
    }
}
