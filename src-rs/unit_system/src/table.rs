//! The static unit table
//!
//! Every recognized unit symbol maps to an expression over the seven SI base
//! units (`m`, `kg`, `s`, `A`, `K`, `mol`, `cd`), numeric literals and `pi`.
//! Every metric prefix maps to its power of ten, written as a literal so
//! that the parser can track it exactly.
//!
//! The table is ordered. The order of [`UNITS`] is also the order in which
//! the [conversion table](conversion_units) is searched for a display unit.

/// The Celsius unit symbol.
pub const CELSIUS: &str = "°C";

/// The offset between the Celsius and Kelvin scales.
pub const CELSIUS_OFFSET: f64 = 273.15;

/// The unit text of a dimensionless quantity.
pub const DIMENSIONLESS: &str = "1";

/// The unit text of the zero sentinel.
///
/// A quantity with this unit is zero and compatible with every unit.
pub const ZERO_SENTINEL: &str = "0";

/// The target that requests automatic selection of the display unit.
pub const AUTO: &str = "auto";

/// Metric prefixes and their multipliers.
pub const PREFIXES: &[(&str, &str)] = &[
    ("Y", "1E24"),
    ("Z", "1E21"),
    ("E", "1E18"),
    ("P", "1E15"),
    ("T", "1E12"),
    ("G", "1E9"),
    ("M", "1E6"),
    ("k", "1E3"),
    ("h", "1E2"),
    ("da", "1E1"),
    ("d", "1E-1"),
    ("c", "1E-2"),
    ("m", "1E-3"),
    // micro sign and greek small letter mu
    ("µ", "1E-6"),
    ("μ", "1E-6"),
    ("n", "1E-9"),
    ("p", "1E-12"),
    ("f", "1E-15"),
    ("a", "1E-18"),
    ("z", "1E-21"),
    ("y", "1E-24"),
];

/// Unit symbols and their base expressions.
pub const UNITS: &[(&str, &str)] = &[
    ("m", "m"),
    ("kg", "kg"),
    ("s", "s"),
    ("A", "A"),
    ("K", "K"),
    ("mol", "mol"),
    ("cd", "cd"),
    ("rad", "1"),
    ("sr", "1"),
    ("Hz", "s**-1"),
    ("N", "m*kg*s**-2"),
    ("Pa", "m**-1*kg*s**-2"),
    ("J", "m**2*kg*s**-2"),
    ("W", "m**2*kg*s**-3"),
    ("C", "s*A"),
    ("V", "m**2*kg*s**-3*A**-1"),
    ("F", "m**-2*kg**-1*s**4*A**2"),
    ("Ω", "m**2*kg*s**-3*A**-2"),
    ("S", "m**-2*kg**-1*s**3*A**2"),
    ("Wb", "m**2*kg*s**-2*A**-1"),
    ("T", "kg*s**-2*A**-1"),
    ("H", "m**2*kg*s**-2*A**-2"),
    ("°C", "K"),
    ("lm", "cd"),
    ("lx", "m**-2*cd"),
    ("Bq", "s**-1"),
    ("Gy", "m**2*s**-2"),
    ("Sv", "m**2*s**-2"),
    ("kat", "s**-1*mol"),
    ("g", "kg/1000"),
    ("min", "60*s"),
    ("h", "3600*s"),
    ("°", "pi/180"),
    ("'", "pi/10800"),
    ("\"", "pi/648000"),
    ("ha", "10**4*m**2"),
    ("L", "10**-3*m**3"),
    ("t", "10**3*kg"),
];

/// Units that are never chosen as display units.
pub const CONVERSION_EXCLUDED: &[&str] = &["g", "rad", "sr", CELSIUS];

/// Display units that are only chosen when their symbol already appears in
/// the unit being converted.
///
/// These share a signature with a more common unit (`Hz` with `Bq`, `Gy`
/// with `Sv`) or are easily mistaken for one (`cd` and `lm`).
pub const GUARDED: &[&str] = &["Hz", "Bq", "lm", "Gy", "Sv", "cd"];

/// A metric prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix {
    /// The prefix symbol, such as `k`
    pub symbol: &'static str,
    /// The multiplier literal, such as `1E3`
    pub multiplier: &'static str,
}

/// A unit table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitEntry {
    /// The unit symbol, such as `N`
    pub symbol: &'static str,
    /// The base expression, such as `m*kg*s**-2`
    pub base: &'static str,
}

/// The result of splitting a symbol into an optional prefix and a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMatch {
    /// The prefix, if the symbol is a prefixed unit
    pub prefix: Option<Prefix>,
    /// The unit
    pub unit: UnitEntry,
}

/// Looks up a unit by its exact symbol.
#[must_use]
pub fn unit(symbol: &str) -> Option<UnitEntry> {
    UNITS
        .iter()
        .find(|(unit, _)| *unit == symbol)
        .map(|&(symbol, base)| UnitEntry { symbol, base })
}

/// Looks up a prefix by its exact symbol.
#[must_use]
pub fn prefix(symbol: &str) -> Option<Prefix> {
    PREFIXES
        .iter()
        .find(|(prefix, _)| *prefix == symbol)
        .map(|&(symbol, multiplier)| Prefix { symbol, multiplier })
}

/// Returns the base expression of a unit symbol.
#[must_use]
pub fn base_expression(symbol: &str) -> Option<&'static str> {
    unit(symbol).map(|entry| entry.base)
}

/// Returns the multiplier of a prefix symbol.
#[must_use]
pub fn prefix_multiplier(symbol: &str) -> Option<f64> {
    prefix(symbol).and_then(|prefix| prefix.multiplier.parse().ok())
}

/// Splits a symbol into an optional prefix and a known unit.
///
/// A symbol that is itself a unit always matches as that unit, so `min`
/// is a minute and `Pa` a pascal. Otherwise the longest prefix that leaves
/// a known unit wins, so `dam` is a decameter.
#[must_use]
pub fn split_symbol(symbol: &str) -> Option<SymbolMatch> {
    if let Some(unit) = unit(symbol) {
        return Some(SymbolMatch { prefix: None, unit });
    }

    PREFIXES
        .iter()
        .filter_map(|&(prefix_symbol, multiplier)| {
            let rest = symbol.strip_prefix(prefix_symbol)?;
            let unit = unit(rest)?;
            Some(SymbolMatch {
                prefix: Some(Prefix {
                    symbol: prefix_symbol,
                    multiplier,
                }),
                unit,
            })
        })
        .max_by_key(|found| found.prefix.map_or(0, |prefix| prefix.symbol.len()))
}

/// Returns `true` if the symbol is guarded in the conversion table.
#[must_use]
pub fn is_guarded(symbol: &str) -> bool {
    GUARDED.contains(&symbol)
}

/// Returns the units that are candidates for automatic display, in search
/// order.
pub fn conversion_units() -> impl Iterator<Item = UnitEntry> {
    UNITS
        .iter()
        .filter(|(symbol, _)| !CONVERSION_EXCLUDED.contains(symbol))
        .map(|&(symbol, base)| UnitEntry { symbol, base })
}

/// Returns `true` if the unit text denotes degrees Celsius.
#[must_use]
pub fn is_celsius(unit: &str) -> bool {
    unit.trim() == CELSIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("min", None, "min")]
    #[case("Pa", None, "Pa")]
    #[case("cd", None, "cd")]
    #[case("ha", None, "ha")]
    #[case("km", Some("k"), "m")]
    #[case("mm", Some("m"), "m")]
    #[case("dam", Some("da"), "m")]
    #[case("dm", Some("d"), "m")]
    #[case("µs", Some("µ"), "s")]
    #[case("μs", Some("μ"), "s")]
    #[case("kΩ", Some("k"), "Ω")]
    #[case("mcd", Some("m"), "cd")]
    #[case("hPa", Some("h"), "Pa")]
    #[case("Gg", Some("G"), "g")]
    fn splits_symbols(
        #[case] symbol: &str,
        #[case] expected_prefix: Option<&str>,
        #[case] expected_unit: &str,
    ) {
        let found = split_symbol(symbol).expect("symbol should be known");
        assert_eq!(found.prefix.map(|prefix| prefix.symbol), expected_prefix);
        assert_eq!(found.unit.symbol, expected_unit);
    }

    #[rstest]
    #[case("x")]
    #[case("kx")]
    #[case("k")]
    #[case("")]
    #[case("mk")]
    fn rejects_unknown_symbols(#[case] symbol: &str) {
        assert_eq!(split_symbol(symbol), None);
    }

    #[test]
    fn prefix_multipliers() {
        assert_eq!(prefix_multiplier("k"), Some(1e3));
        assert_eq!(prefix_multiplier("µ"), Some(1e-6));
        assert_eq!(prefix_multiplier("da"), Some(10.0));
        assert_eq!(prefix_multiplier("q"), None);
    }

    #[test]
    fn base_expressions() {
        assert_eq!(base_expression("N"), Some("m*kg*s**-2"));
        assert_eq!(base_expression("g"), Some("kg/1000"));
        assert_eq!(base_expression("°C"), Some("K"));
        assert_eq!(base_expression("furlong"), None);
    }

    #[test]
    fn conversion_units_skip_excluded_entries_and_keep_order() {
        let symbols: Vec<_> = conversion_units().map(|entry| entry.symbol).collect();

        for excluded in CONVERSION_EXCLUDED {
            assert!(!symbols.contains(excluded));
        }
        assert_eq!(&symbols[..4], &["m", "kg", "s", "A"]);
        assert_eq!(symbols.last(), Some(&"t"));
        assert_eq!(symbols.len(), UNITS.len() - CONVERSION_EXCLUDED.len());
    }

    #[test]
    fn every_guarded_unit_is_a_conversion_unit() {
        for guarded in GUARDED {
            assert!(conversion_units().any(|entry| entry.symbol == *guarded));
        }
    }
}
