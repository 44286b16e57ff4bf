//! Replaces unit symbols with their base expressions

use std::fmt;

use tracing::warn;

use crate::{
    config::UnknownSymbolPolicy,
    error::ParseError,
    parser::{
        grammar::{self, UnitExpr},
        token::{Exponent, tokenize},
    },
    signature::BaseUnit,
    table,
};

const PI: &str = "pi";

/// A unit expression written only in terms of base units, numbers and `pi`.
///
/// Its `Display` is the algebraic string the expression was rewritten to,
/// for example `(1E-3*m)*(1E3*kg)*(s)**-2` for `mm*Mg*s**-2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawExpr {
    /// A numeric literal, as written
    Number(String),
    /// An SI base unit
    Base(BaseUnit),
    /// The constant π
    Pi,
    /// A symbol passed through without a definition
    Opaque(String),
    /// A parenthesized expression
    Group(Box<Self>),
    /// The square root of an expression
    Sqrt(Box<Self>),
    /// `lhs * rhs`
    Multiply(Box<Self>, Box<Self>),
    /// `lhs / rhs`
    Divide(Box<Self>, Box<Self>),
    /// `base ** exponent`
    Power(Box<Self>, Exponent),
}

impl fmt::Display for RawExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(text) | Self::Opaque(text) => f.write_str(text),
            Self::Base(unit) => f.write_str(unit.symbol()),
            Self::Pi => f.write_str(PI),
            Self::Group(inner) => write!(f, "({inner})"),
            Self::Sqrt(inner) => write!(f, "sqrt({inner})"),
            Self::Multiply(lhs, rhs) => write!(f, "{lhs}*{rhs}"),
            Self::Divide(lhs, rhs) => write!(f, "{lhs}/{rhs}"),
            Self::Power(base, exponent) => write!(f, "{base}**{exponent}"),
        }
    }
}

/// The symbols an expression may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Unit table symbols, optionally prefixed
    Units(UnknownSymbolPolicy),
    /// Base unit symbols and `pi` only, as used by the unit table itself
    BaseUnits,
}

/// Rewrites a unit expression in terms of base units.
///
/// Every unit symbol is replaced by its parenthesized base expression,
/// multiplied by the prefix literal when the symbol is prefixed.
///
/// # Errors
///
/// Returns an error if a symbol is not in the vocabulary and the policy
/// rejects unknown symbols.
pub fn substitute(expr: &UnitExpr<'_>, vocabulary: Vocabulary) -> Result<RawExpr, ParseError> {
    let recurse = |inner: &UnitExpr<'_>| substitute(inner, vocabulary).map(Box::new);

    Ok(match expr {
        UnitExpr::Atom(symbol) => substitute_atom(symbol, vocabulary)?,
        UnitExpr::Number(literal) => RawExpr::Number((*literal).to_owned()),
        UnitExpr::Group(inner) => RawExpr::Group(recurse(inner)?),
        UnitExpr::Sqrt(inner) => RawExpr::Sqrt(recurse(inner)?),
        UnitExpr::Multiply(lhs, rhs) => RawExpr::Multiply(recurse(lhs)?, recurse(rhs)?),
        UnitExpr::Divide(lhs, rhs) => RawExpr::Divide(recurse(lhs)?, recurse(rhs)?),
        UnitExpr::Power(base, exponent) => RawExpr::Power(recurse(base)?, *exponent),
    })
}

fn substitute_atom(symbol: &str, vocabulary: Vocabulary) -> Result<RawExpr, ParseError> {
    let unknown = || ParseError::UnknownUnitSymbol {
        symbol: symbol.to_owned(),
    };

    match vocabulary {
        Vocabulary::BaseUnits => match BaseUnit::from_symbol(symbol) {
            Some(unit) => Ok(RawExpr::Base(unit)),
            None if symbol == PI => Ok(RawExpr::Pi),
            None => Err(unknown()),
        },
        Vocabulary::Units(policy) => {
            if let Some(found) = table::split_symbol(symbol) {
                let base = parse_base_expression(found.unit.base)?;
                let inner = match found.prefix {
                    Some(prefix) => RawExpr::Multiply(
                        Box::new(RawExpr::Number(prefix.multiplier.to_owned())),
                        Box::new(base),
                    ),
                    None => base,
                };
                return Ok(RawExpr::Group(Box::new(inner)));
            }

            if symbol == PI {
                return Ok(RawExpr::Pi);
            }

            match policy {
                UnknownSymbolPolicy::Reject => Err(unknown()),
                UnknownSymbolPolicy::PassThrough => {
                    warn!(symbol, "passing unknown unit symbol through");
                    Ok(RawExpr::Group(Box::new(RawExpr::Opaque(symbol.to_owned()))))
                }
            }
        }
    }
}

/// Parses an expression over base units and `pi`, such as a unit table
/// entry.
///
/// # Errors
///
/// Returns an error if the expression is malformed or uses anything but
/// base units, numbers and `pi`.
pub fn parse_base_expression(expression: &str) -> Result<RawExpr, ParseError> {
    let tokens = tokenize(expression)?;
    let parsed = grammar::parse(expression, &tokens)?;
    substitute(&parsed, Vocabulary::BaseUnits)
}
