//! Choice of the display unit for a signature
//!
//! When a quantity is converted with the `auto` target, its signature is
//! looked up in the conversion table: the first unit in table order with the
//! same signature and a scale of one wins, so `kg*m*s**-2` shows as `N`.
//! Guarded units only win when their symbol already appears in the unit
//! being converted, so `s**-1` stays `s**-1` unless the quantity was written
//! in `Hz` or `Bq`.
//!
//! Without a match the canonical signature text is used.

use indexmap::IndexMap;
use tracing::error;

use crate::{
    parser::{ParsedUnit, UnitParser},
    table,
    util::is_close,
};

/// A candidate display unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionEntry {
    parsed: ParsedUnit,
    guarded: bool,
}

impl ConversionEntry {
    /// Returns the parsed base expression of the unit.
    #[must_use]
    pub const fn parsed(&self) -> &ParsedUnit {
        &self.parsed
    }

    /// Returns `true` if the unit only matches when already in use.
    #[must_use]
    pub const fn is_guarded(&self) -> bool {
        self.guarded
    }
}

/// The ordered table of candidate display units.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTable {
    entries: IndexMap<&'static str, ConversionEntry>,
}

impl ConversionTable {
    /// Builds the table from the unit table.
    #[must_use]
    pub fn new(parser: &UnitParser) -> Self {
        let entries = table::conversion_units()
            .filter_map(|entry| match parser.parse_base(entry.base) {
                Ok(parsed) => Some((
                    entry.symbol,
                    ConversionEntry {
                        parsed,
                        guarded: table::is_guarded(entry.symbol),
                    },
                )),
                Err(parse_error) => {
                    error!(
                        symbol = entry.symbol,
                        %parse_error,
                        "skipping malformed unit table entry"
                    );
                    None
                }
            })
            .collect();

        Self { entries }
    }

    /// Returns the entries in search order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &ConversionEntry)> {
        self.entries.iter().map(|(symbol, entry)| (*symbol, entry))
    }

    /// Returns the entry for a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&ConversionEntry> {
        self.entries.get(symbol)
    }

    /// Returns the display unit for a quantity whose unit, written as
    /// `current_unit`, parses to `parsed`.
    ///
    /// The returned unit has the same signature as `parsed` and a scale of
    /// one; values must be multiplied by `parsed.scale()` to be expressed in
    /// it.
    #[must_use]
    pub fn resolve(&self, parsed: &ParsedUnit, current_unit: &str) -> String {
        self.entries()
            .find(|(symbol, entry)| {
                entry.parsed.signature() == parsed.signature()
                    && is_close(entry.parsed.scale(), 1.0)
                    && (!entry.guarded || current_unit.contains(symbol))
            })
            .map_or_else(
                || parsed.signature().to_string(),
                |(symbol, _)| symbol.to_owned(),
            )
    }
}
