#![no_main]

use libfuzzer_sys::fuzz_target;
use unit_system::UnitSystem;

fuzz_target!(|expression: &str| {
    let cached = UnitSystem::new();
    let first = cached.parse(expression);
    let second = cached.parse(expression);
    let fresh = UnitSystem::new().parse(expression);

    assert_eq!(first, second, "cached parse of {expression:?} differs");
    assert_eq!(first, fresh, "parse of {expression:?} depends on the cache");

    if let Ok(parsed) = first {
        let canonical = parsed.signature().to_string();
        let reparsed = cached
            .parse(&canonical)
            .unwrap_or_else(|error| panic!("canonical text {canonical:?} does not parse: {error}"));
        assert_eq!(reparsed.signature(), parsed.signature());
    }
});
