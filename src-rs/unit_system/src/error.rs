//! Error types for parsing units and operating on quantities

use thiserror::Error;

/// An error produced while parsing a unit expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The expression is not well formed.
    #[error("invalid unit expression `{expression}` at offset {offset}: expected {expected}")]
    Syntax {
        /// The expression being parsed
        expression: String,
        /// Byte offset of the offending input
        offset: usize,
        /// What the parser expected to find
        expected: String,
    },
    /// A symbol is neither a known unit nor a prefixed known unit.
    #[error("unknown unit symbol `{symbol}`")]
    UnknownUnitSymbol {
        /// The unrecognized symbol
        symbol: String,
    },
    /// An exponent could not be represented as a rational number.
    #[error("invalid exponent `{exponent}`")]
    InvalidExponent {
        /// The exponent as written
        exponent: String,
    },
    /// An exponent, or a power of ten in a numeric literal, is too large to
    /// track exactly.
    #[error("unit expression `{expression}` has an exponent out of range")]
    ExponentOverflow {
        /// The expression being parsed
        expression: String,
    },
    /// The expression evaluates to a zero or non-finite scale factor.
    #[error("unit expression `{expression}` has no positive finite scale")]
    ZeroScale {
        /// The expression being parsed
        expression: String,
    },
}

/// An error produced by an operation on quantities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// A unit expression failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The operands of an operation have incompatible dimensions.
    #[error("cannot {operation} `{expected}` and `{found}`")]
    IncompatibleUnits {
        /// The operation name
        operation: String,
        /// Signature of the first dimensioned operand
        expected: String,
        /// Signature of the conflicting operand
        found: String,
    },
    /// The operation or method is not supported on quantities.
    #[error("operation `{operation}` is not supported on quantities")]
    UnsupportedOperation {
        /// The operation name
        operation: String,
    },
    /// An exponent was a quantity or could not be used as a unit power.
    #[error("invalid exponent: {reason}")]
    InvalidExponent {
        /// Why the exponent was rejected
        reason: String,
    },
    /// An index is outside of the quantity's data.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The length of the indexed axis
        len: usize,
    },
    /// The unit is not in the legacy conversion table.
    #[error("unknown legacy unit `{symbol}`")]
    UnknownLegacyUnit {
        /// The requested symbol
        symbol: String,
    },
    /// An explicit conversion would change dimensions.
    #[error("cannot convert `{from}` to `{to}`: dimensions differ")]
    DimensionMismatch {
        /// The current unit
        from: String,
        /// The requested unit
        to: String,
    },
    /// The operand shapes cannot be broadcast together.
    #[error("shapes {left:?} and {right:?} cannot be broadcast together")]
    ShapeMismatch {
        /// Shape of the left operand
        left: Vec<usize>,
        /// Shape of the right operand
        right: Vec<usize>,
    },
    /// An operation received the wrong number of operands.
    #[error("`{operation}` expects {expected} operand(s), found {found}")]
    ArityMismatch {
        /// The operation name
        operation: String,
        /// The expected operand count
        expected: usize,
        /// The given operand count
        found: usize,
    },
    /// A reduction without identity was applied to an empty quantity.
    #[error("cannot reduce an empty quantity with `{operation}`")]
    EmptyReduction {
        /// The operation name
        operation: String,
    },
}

impl UnitError {
    pub(crate) fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    pub(crate) fn invalid_exponent(reason: impl Into<String>) -> Self {
        Self::InvalidExponent {
            reason: reason.into(),
        }
    }

    pub(crate) fn exponent_overflow(operation: &str) -> Self {
        Self::invalid_exponent(format!("`{operation}` leaves the supported exponent range"))
    }
}
