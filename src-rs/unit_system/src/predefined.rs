//! Quantities of exactly one unit
//!
//! `predefined::unit(&system, "V")` is the quantity `1 V`, so values can be
//! scaled by a unit with [`UnitSystem::multiply`].

use indexmap::IndexMap;
use tracing::trace;

use crate::{
    error::{ParseError, UnitError},
    quantity::Quantity,
    system::UnitSystem,
    table,
};

/// Returns one of the unit named by `symbol`, which may carry a prefix.
///
/// # Errors
///
/// Returns [`ParseError::UnknownUnitSymbol`] if the symbol is neither a
/// unit nor a prefixed unit.
pub fn unit(system: &UnitSystem, symbol: &str) -> Result<Quantity, UnitError> {
    if table::split_symbol(symbol).is_none() {
        return Err(ParseError::UnknownUnitSymbol {
            symbol: symbol.to_owned(),
        }
        .into());
    }

    trace!(symbol, "building predefined unit");
    system.quantity(1.0, symbol)
}

/// Returns one of every unprefixed unit in the unit table, keyed by symbol
/// in table order.
///
/// # Errors
///
/// Returns an error if a table entry does not parse.
pub fn all(system: &UnitSystem) -> Result<IndexMap<&'static str, Quantity>, UnitError> {
    table::UNITS
        .iter()
        .map(|&(symbol, _)| Ok((symbol, system.quantity(1.0, symbol)?)))
        .collect()
}
