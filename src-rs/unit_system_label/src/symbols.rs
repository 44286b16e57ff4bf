//! Standard symbols and names of common quantities

use unit_system::table;

/// A quantity that is commonly measured in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardQuantity {
    /// The unit symbol without prefix
    pub unit: &'static str,
    /// The conventional quantity symbol
    pub symbol: &'static str,
    /// The quantity name used in captions
    pub name: &'static str,
}

/// The standard quantities, keyed by unit.
pub const STANDARD_QUANTITIES: &[StandardQuantity] = &[
    StandardQuantity { unit: "A", symbol: "I", name: "Current" },
    StandardQuantity { unit: "V", symbol: "U", name: "Voltage" },
    StandardQuantity { unit: "s", symbol: "t", name: "Time" },
    StandardQuantity { unit: "Hz", symbol: "f", name: "Frequency" },
    StandardQuantity { unit: "m", symbol: "l", name: "Length" },
    StandardQuantity { unit: "kg", symbol: "m", name: "Mass" },
    StandardQuantity { unit: "g", symbol: "m", name: "Mass" },
    StandardQuantity { unit: "K", symbol: "T", name: "Temperature" },
    StandardQuantity { unit: "°C", symbol: "T", name: "Temperature" },
    StandardQuantity { unit: "W", symbol: "P", name: "Power" },
    StandardQuantity { unit: "Ω", symbol: "R", name: "Resistance" },
    StandardQuantity { unit: "F", symbol: "C", name: "Capacitance" },
    StandardQuantity { unit: "H", symbol: "L", name: "Inductance" },
    StandardQuantity { unit: "C", symbol: "Q", name: "Charge" },
    StandardQuantity { unit: "N", symbol: "F", name: "Force" },
    StandardQuantity { unit: "Pa", symbol: "p", name: "Pressure" },
    StandardQuantity { unit: "J", symbol: "E", name: "Energy" },
];

/// Returns the standard quantity for a unit, ignoring a metric prefix.
///
/// Only single unit symbols such as `mA` have a standard quantity;
/// compound expressions never do.
#[must_use]
pub fn lookup(unit: &str) -> Option<&'static StandardQuantity> {
    let found = table::split_symbol(unit.trim())?;
    STANDARD_QUANTITIES
        .iter()
        .find(|quantity| quantity.unit == found.unit.symbol)
}
