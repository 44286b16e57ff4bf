//! Dimensional signatures
//!
//! A signature is a product of symbols raised to exact rational powers, such
//! as `kg*m*s**-2`. Two units are dimensionally compatible exactly when their
//! signatures are equal.

use std::{cmp::Ordering, fmt};

use indexmap::IndexMap;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, One, Zero};

/// Largest numerator or denominator an exponent may have.
///
/// The sum or product of two exponents within this bound fits in an `i64`,
/// so exponent arithmetic is range checked before it can overflow.
pub const MAX_EXPONENT_TERM: u64 = 0x7FFF_FFFF;

/// Returns the exponent if its numerator and denominator are at most
/// [`MAX_EXPONENT_TERM`] in magnitude.
#[must_use]
pub fn bounded_exponent(exponent: Rational64) -> Option<Rational64> {
    (exponent.numer().unsigned_abs() <= MAX_EXPONENT_TERM
        && exponent.denom().unsigned_abs() <= MAX_EXPONENT_TERM)
        .then_some(exponent)
}

/// One of the seven SI base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseUnit {
    /// Meter, length
    Meter,
    /// Kilogram, mass
    Kilogram,
    /// Second, time
    Second,
    /// Ampere, electric current
    Ampere,
    /// Kelvin, temperature
    Kelvin,
    /// Mole, amount of substance
    Mole,
    /// Candela, luminous intensity
    Candela,
}

impl BaseUnit {
    /// All base units.
    pub const ALL: [Self; 7] = [
        Self::Meter,
        Self::Kilogram,
        Self::Second,
        Self::Ampere,
        Self::Kelvin,
        Self::Mole,
        Self::Candela,
    ];

    /// Returns the unit symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Meter => "m",
            Self::Kilogram => "kg",
            Self::Second => "s",
            Self::Ampere => "A",
            Self::Kelvin => "K",
            Self::Mole => "mol",
            Self::Candela => "cd",
        }
    }

    /// Looks up a base unit by its symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.symbol() == symbol)
    }
}

/// A symbol in a signature.
///
/// Opaque symbols only appear when the parser passes unknown symbols through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// An SI base unit
    Base(BaseUnit),
    /// A symbol without a known definition
    Opaque(String),
}

impl Symbol {
    /// Returns the name of the symbol as written in unit expressions.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Base(unit) => unit.symbol(),
            Self::Opaque(name) => name,
        }
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A product of symbols raised to rational powers.
///
/// Factors are kept sorted by symbol name and factors with a zero exponent
/// are dropped, so equal signatures have equal text. Every exponent is
/// within [`MAX_EXPONENT_TERM`]; operations that would leave that range
/// return `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature(IndexMap<Symbol, Rational64>);

impl Signature {
    /// Creates the signature of a dimensionless quantity.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self(IndexMap::new())
    }

    pub(crate) fn from_factors(
        factors: impl IntoIterator<Item = (Symbol, Rational64)>,
    ) -> Option<Self> {
        let mut map: IndexMap<Symbol, Rational64> = IndexMap::new();
        for (symbol, exponent) in factors {
            let exponent = bounded_exponent(exponent)?;
            let total = map.entry(symbol).or_insert_with(Rational64::zero);
            *total = bounded_exponent(total.checked_add(&exponent)?)?;
        }
        Some(Self::normalized(map))
    }

    fn normalized(mut map: IndexMap<Symbol, Rational64>) -> Self {
        map.retain(|_, exponent| !exponent.is_zero());
        map.sort_keys();
        Self(map)
    }

    /// Returns `true` if the signature has no factors.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the exponent of a base unit, zero if it does not appear.
    #[must_use]
    pub fn exponent(&self, unit: BaseUnit) -> Rational64 {
        self.0
            .get(&Symbol::Base(unit))
            .copied()
            .unwrap_or_else(Rational64::zero)
    }

    /// Returns the factors in name order.
    pub fn factors(&self) -> impl Iterator<Item = (&Symbol, Rational64)> {
        self.0.iter().map(|(symbol, exponent)| (symbol, *exponent))
    }

    /// Returns `true` if the signature contains symbols without a definition.
    #[must_use]
    pub fn has_opaque_symbols(&self) -> bool {
        self.0.keys().any(|symbol| matches!(symbol, Symbol::Opaque(_)))
    }

    /// Raises the signature to a rational power.
    ///
    /// Returns `None` if an exponent leaves the supported range.
    #[must_use]
    pub fn checked_pow(&self, exponent: Rational64) -> Option<Self> {
        let exponent = bounded_exponent(exponent)?;
        let map = self
            .0
            .iter()
            .map(|(symbol, power)| {
                let power = bounded_exponent(power.checked_mul(&exponent)?)?;
                Some((symbol.clone(), power))
            })
            .collect::<Option<_>>()?;
        Some(Self::normalized(map))
    }

    /// Multiplies two signatures.
    ///
    /// Returns `None` if an exponent leaves the supported range.
    #[must_use]
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        Self::from_factors(
            self.factors()
                .chain(rhs.factors())
                .map(|(symbol, exponent)| (symbol.clone(), exponent)),
        )
    }

    /// Divides two signatures.
    ///
    /// Returns `None` if an exponent leaves the supported range.
    #[must_use]
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        self.checked_mul(&rhs.recip())
    }

    /// Returns the multiplicative inverse of the signature.
    #[must_use]
    pub fn recip(&self) -> Self {
        // bounded exponents always negate
        Self(
            self.0
                .iter()
                .map(|(symbol, exponent)| (symbol.clone(), -*exponent))
                .collect(),
        )
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("1");
        }

        for (index, (symbol, exponent)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("*")?;
            }

            let half = Rational64::new(1, 2);
            if exponent.is_one() {
                write!(f, "{symbol}")?;
            } else if *exponent == half {
                write!(f, "sqrt({symbol})")?;
            } else if exponent.is_integer() {
                write!(f, "{symbol}**{exponent}")?;
            } else {
                write!(f, "{symbol}**({exponent})")?;
            }
        }

        Ok(())
    }
}
