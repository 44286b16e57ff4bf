#![no_main]

use libfuzzer_sys::{arbitrary, fuzz_target};
use unit_system::{Quantity, UnitSystem, table, util::is_close};

const UNITS: &[&str] = &["m", "s", "A", "V", "Pa", "J", "W", "Ω", "g", "°C", "K", "Hz"];

#[derive(Debug, Clone, PartialEq, arbitrary::Arbitrary)]
struct FuzzData {
    value: f64,
    unit: u8,
    from_prefix: u8,
    to_prefix: u8,
}

fn prefixed(prefix: u8, unit: &str) -> String {
    let prefix = table::PREFIXES[usize::from(prefix) % table::PREFIXES.len()].0;
    format!("{prefix}{unit}")
}

fuzz_target!(|data: FuzzData| {
    if !data.value.is_finite() || data.value.abs() > 1e100 {
        return;
    }

    let unit = UNITS[usize::from(data.unit) % UNITS.len()];
    let from = prefixed(data.from_prefix, unit);
    let to = prefixed(data.to_prefix, unit);

    let units = UnitSystem::new();
    let Ok(mut quantity) = Quantity::with_target(&units, data.value, &from, &from) else {
        // some prefixed spellings are other units, such as `Pa` or `min`
        return;
    };
    if quantity.to(&units, &to).is_err() {
        return;
    }
    quantity
        .to(&units, &from)
        .expect("converting back should succeed");

    let value = quantity.value().expect("quantity should be a scalar");
    assert!(
        is_close(value, data.value)
            || (value - data.value).abs() <= 1e-9 * data.value.abs().max(1.0),
        "{} {from} -> {to} -> {from} gave {value}",
        data.value,
    );
});
