//! Configuration for the unit system

use std::num::NonZeroUsize;

const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// How the parser treats a symbol that is neither a known unit nor a
/// prefixed known unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSymbolPolicy {
    /// Unknown symbols are a parse error.
    #[default]
    Reject,
    /// Unknown symbols are kept as opaque factors of the signature.
    PassThrough,
}

/// How an explicit conversion treats a target unit with different dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionPolicy {
    /// Converting between different dimensions is an error.
    #[default]
    Strict,
    /// The uncanceled part of the ratio is prepended to the target unit.
    Lenient,
}

/// Configuration for a [`UnitSystem`](crate::UnitSystem).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    cache_capacity: NonZeroUsize,
    unknown_symbols: UnknownSymbolPolicy,
    conversion: ConversionPolicy,
}

impl Config {
    /// Creates the default configuration: a 1024 entry parse cache,
    /// rejection of unknown symbols and strict conversions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            unknown_symbols: UnknownSymbolPolicy::Reject,
            conversion: ConversionPolicy::Strict,
        }
    }

    /// Sets the maximum number of parsed unit expressions kept in the cache.
    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the policy for unknown unit symbols.
    #[must_use]
    pub const fn with_unknown_symbols(mut self, policy: UnknownSymbolPolicy) -> Self {
        self.unknown_symbols = policy;
        self
    }

    /// Sets the policy for conversions between different dimensions.
    #[must_use]
    pub const fn with_conversion(mut self, policy: ConversionPolicy) -> Self {
        self.conversion = policy;
        self
    }

    /// Returns the parse cache capacity.
    #[must_use]
    pub const fn cache_capacity(&self) -> NonZeroUsize {
        self.cache_capacity
    }

    /// Returns the unknown symbol policy.
    #[must_use]
    pub const fn unknown_symbols(&self) -> UnknownSymbolPolicy {
        self.unknown_symbols
    }

    /// Returns the conversion policy.
    #[must_use]
    pub const fn conversion(&self) -> ConversionPolicy {
        self.conversion
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
