//! Parsing of unit expressions
//!
//! A unit expression such as `kΩ*mA` or `N/km` is parsed in four stages:
//!
//! 1. [`tokenize`] splits the text into atoms, numbers and operators;
//! 2. the grammar builds an expression tree from the tokens;
//! 3. [`substitute`] replaces every unit symbol with its base expression,
//!    prefix multiplier included;
//! 4. [`canonicalize`] reduces the result to a positive scale factor and a
//!    [`Signature`] over the base units.
//!
//! Results are memoized per [`UnitParser`] in a [`ParseCache`].

use std::fmt;

use tracing::{debug, trace};

use crate::{config::Config, error::ParseError, signature::Signature};

mod cache;
mod canonical;
mod grammar;
mod substitute;
mod token;

pub use cache::{LruParseCache, ParseCache};
pub use canonical::canonicalize;
pub use grammar::UnitExpr;
pub use substitute::{RawExpr, Vocabulary, parse_base_expression};
pub use token::{Exponent, Token, TokenKind, tokenize};

/// A unit reduced to a scale factor and a signature.
///
/// A quantity `v` in this unit is `v * scale` in the base units of the
/// signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUnit {
    scale: f64,
    signature: Signature,
}

impl ParsedUnit {
    pub(crate) const fn new(scale: f64, signature: Signature) -> Self {
        Self { scale, signature }
    }

    /// Returns the factor that converts values into base units.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the signature.
    #[must_use]
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns `true` if the signature has no factors.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.signature.is_dimensionless()
    }
}

impl fmt::Display for ParsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}*{}", self.scale, self.signature)
    }
}

/// Parses a unit expression down to the base units of its symbols.
///
/// # Errors
///
/// Returns an error if the expression is malformed, uses an unknown symbol
/// and the policy rejects unknown symbols, or has no positive scale.
pub fn substitute(expression: &str, vocabulary: Vocabulary) -> Result<RawExpr, ParseError> {
    let tokens = tokenize(expression)?;
    let parsed = grammar::parse(expression, &tokens)?;
    substitute::substitute(&parsed, vocabulary)
}

/// Parses unit expressions with a cache of previous results.
pub struct UnitParser {
    config: Config,
    cache: Box<dyn ParseCache>,
}

impl UnitParser {
    /// Creates a parser with an [`LruParseCache`] of the configured capacity.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_cache(config, LruParseCache::new(config.cache_capacity()))
    }

    /// Creates a parser that memoizes into the given cache.
    #[must_use]
    pub fn with_cache(config: Config, cache: impl ParseCache + 'static) -> Self {
        Self {
            config,
            cache: Box::new(cache),
        }
    }

    /// Returns the parser configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the parse cache.
    #[must_use]
    pub fn cache(&self) -> &dyn ParseCache {
        self.cache.as_ref()
    }

    /// Parses a unit expression into its scale and signature.
    ///
    /// ```
    /// use unit_system::{Config, parser::UnitParser};
    ///
    /// let parser = UnitParser::new(Config::new());
    /// let parsed = parser.parse("N/km")?;
    /// assert_eq!(parsed.scale(), 0.001);
    /// assert_eq!(parsed.signature().to_string(), "kg*s**-2");
    /// # Ok::<(), unit_system::ParseError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed, uses an unknown
    /// symbol that the configuration rejects, or has no positive scale.
    pub fn parse(&self, expression: &str) -> Result<ParsedUnit, ParseError> {
        if let Some(parsed) = self.cache.get(expression) {
            trace!(expression, "unit cache hit");
            return Ok(parsed);
        }

        let raw = self.substitute(expression)?;
        let parsed = canonicalize(expression, &raw)?;
        debug!(
            expression,
            substituted = %raw,
            scale = parsed.scale,
            signature = %parsed.signature,
            "parsed unit"
        );

        self.cache.insert(expression.to_owned(), parsed.clone());
        Ok(parsed)
    }

    /// Rewrites a unit expression in base units without reducing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed or uses an unknown
    /// symbol that the configuration rejects.
    pub fn substitute(&self, expression: &str) -> Result<RawExpr, ParseError> {
        substitute(
            expression,
            Vocabulary::Units(self.config.unknown_symbols()),
        )
    }

    /// Parses an expression over base units and `pi` without caching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is malformed or uses anything but
    /// base units, numbers and `pi`.
    pub fn parse_base(&self, expression: &str) -> Result<ParsedUnit, ParseError> {
        let raw = parse_base_expression(expression)?;
        canonicalize(expression, &raw)
    }
}

impl Default for UnitParser {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for UnitParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitParser")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .finish()
    }
}
