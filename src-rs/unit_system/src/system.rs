//! The entry point for working with units

use ndarray::ArrayD;

use crate::{
    algebra::Operation,
    config::Config,
    engine::{self, Evaluated, Method, Operand},
    error::UnitError,
    legacy,
    parser::{ParsedUnit, UnitParser},
    quantity::{IntoValues, Quantity},
    resolve::ConversionTable,
    sequence,
    table::AUTO,
};

/// A unit parser together with the conversion table built from it.
///
/// Every operation on quantities goes through a `UnitSystem`, which owns the
/// memoized parser so repeated unit expressions are only parsed once.
#[derive(Debug)]
pub struct UnitSystem {
    parser: UnitParser,
    table: ConversionTable,
}

impl UnitSystem {
    /// Creates a unit system with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a unit system with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_parser(UnitParser::new(config))
    }

    /// Creates a unit system around an existing parser.
    #[must_use]
    pub fn with_parser(parser: UnitParser) -> Self {
        let table = ConversionTable::new(&parser);
        Self { parser, table }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        self.parser.config()
    }

    /// Returns the parser.
    #[must_use]
    pub const fn parser(&self) -> &UnitParser {
        &self.parser
    }

    /// Returns the conversion table used by the `auto` target.
    #[must_use]
    pub const fn conversion_table(&self) -> &ConversionTable {
        &self.table
    }

    /// Parses a unit expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not parse.
    pub fn parse(&self, unit: &str) -> Result<ParsedUnit, UnitError> {
        Ok(self.parser.parse(unit)?)
    }

    /// Returns the unit a quantity written in `unit` is shown in with the
    /// `auto` target.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not parse.
    pub fn resolve(&self, unit: &str) -> Result<String, UnitError> {
        let parsed = self.parse(unit)?;
        Ok(self.table.resolve(&parsed, unit))
    }

    /// Creates a quantity, see [`Quantity::new`].
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse.
    pub fn quantity(&self, values: impl IntoValues, unit: &str) -> Result<Quantity, UnitError> {
        Quantity::new(self, values, unit)
    }

    /// Applies an operation elementwise, converting the result to its
    /// display unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the operand units are incompatible with the
    /// operation, or if the operand shapes do not broadcast.
    pub fn apply(
        &self,
        operation: Operation,
        operands: &[Operand<'_>],
    ) -> Result<Evaluated, UnitError> {
        self.apply_with(operation, Method::Call, operands, AUTO)
    }

    /// Applies an operation with the given method, converting a quantity
    /// result to `target`.
    ///
    /// # Errors
    ///
    /// See [`UnitSystem::apply`]. [`Method::At`] is never supported.
    pub fn apply_with(
        &self,
        operation: Operation,
        method: Method,
        operands: &[Operand<'_>],
        target: &str,
    ) -> Result<Evaluated, UnitError> {
        engine::evaluate(self, operation, method, operands, target)
    }

    /// Applies an operation given by name, such as `"multiply"`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::UnsupportedOperation`] for unknown names, and
    /// otherwise see [`UnitSystem::apply`].
    pub fn apply_named(
        &self,
        name: &str,
        operands: &[Operand<'_>],
    ) -> Result<Evaluated, UnitError> {
        self.apply(name.parse()?, operands)
    }

    /// Applies an operation and stores the result in `out`, converted to the
    /// target of `out`.
    ///
    /// # Errors
    ///
    /// See [`UnitSystem::apply`]. Comparisons cannot be stored in a quantity
    /// and the result must have the shape of `out`. `out` is unchanged on
    /// error.
    pub fn apply_into(
        &self,
        operation: Operation,
        operands: &[Operand<'_>],
        out: &mut Quantity,
    ) -> Result<(), UnitError> {
        engine::evaluate_into(self, operation, operands, out)
    }

    /// Combines `accumulator` with `rhs` in place, as in `a += b`.
    ///
    /// # Errors
    ///
    /// See [`UnitSystem::apply_into`].
    pub fn accumulate<'a>(
        &self,
        operation: Operation,
        accumulator: &mut Quantity,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<(), UnitError> {
        let current = accumulator.clone();
        self.apply_into(operation, &[Operand::Quantity(&current), rhs.into()], accumulator)
    }

    /// Reduces all elements of a quantity with `add`, `multiply`, `minimum`
    /// or `maximum`.
    ///
    /// # Errors
    ///
    /// Returns an error for other operations and for `minimum` or `maximum`
    /// of an empty quantity.
    pub fn reduce(&self, operation: Operation, quantity: &Quantity) -> Result<Quantity, UnitError> {
        self.quantity_result(operation, Method::Reduce, &[Operand::Quantity(quantity)])
    }

    /// Sums all elements of a quantity.
    ///
    /// # Errors
    ///
    /// See [`UnitSystem::reduce`].
    pub fn sum(&self, quantity: &Quantity) -> Result<Quantity, UnitError> {
        self.reduce(Operation::Add, quantity)
    }

    fn quantity_result(
        &self,
        operation: Operation,
        method: Method,
        operands: &[Operand<'_>],
    ) -> Result<Quantity, UnitError> {
        match self.apply_with(operation, method, operands, AUTO)? {
            Evaluated::Quantity(quantity) => Ok(quantity),
            Evaluated::Boolean(_) | Evaluated::Numeric(_) => Err(UnitError::unsupported(format!(
                "{operation} as a quantity"
            ))),
        }
    }

    fn binary<'a>(
        &self,
        operation: Operation,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.quantity_result(operation, Method::Call, &[lhs.into(), rhs.into()])
    }

    fn unary<'a>(
        &self,
        operation: Operation,
        operand: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.quantity_result(operation, Method::Call, &[operand.into()])
    }

    fn comparison<'a>(
        &self,
        operation: Operation,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        match self.apply(operation, &[lhs.into(), rhs.into()])? {
            Evaluated::Boolean(values) => Ok(values),
            Evaluated::Quantity(_) | Evaluated::Numeric(_) => Err(UnitError::unsupported(format!(
                "{operation} as a comparison"
            ))),
        }
    }

    /// Adds two operands of the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn add<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Add, lhs, rhs)
    }

    /// Subtracts two operands of the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn subtract<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Subtract, lhs, rhs)
    }

    /// Multiplies two operands.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes do not broadcast.
    pub fn multiply<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Multiply, lhs, rhs)
    }

    /// Divides two operands.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes do not broadcast.
    pub fn divide<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Divide, lhs, rhs)
    }

    /// Raises `base` to a dimensionless exponent.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidExponent`] if the exponent is a quantity
    /// or, for a dimensioned base, not a single number.
    pub fn power<'a>(
        &self,
        base: impl Into<Operand<'a>>,
        exponent: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Power, base, exponent)
    }

    /// Takes the elementwise minimum of two operands of the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn minimum<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Minimum, lhs, rhs)
    }

    /// Takes the elementwise maximum of two operands of the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn maximum<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Quantity, UnitError> {
        self.binary(Operation::Maximum, lhs, rhs)
    }

    /// Negates an operand.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse.
    pub fn negative<'a>(&self, operand: impl Into<Operand<'a>>) -> Result<Quantity, UnitError> {
        self.unary(Operation::Negative, operand)
    }

    /// Takes the absolute value of an operand.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse.
    pub fn absolute<'a>(&self, operand: impl Into<Operand<'a>>) -> Result<Quantity, UnitError> {
        self.unary(Operation::Absolute, operand)
    }

    /// Squares an operand.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse.
    pub fn square<'a>(&self, operand: impl Into<Operand<'a>>) -> Result<Quantity, UnitError> {
        self.unary(Operation::Square, operand)
    }

    /// Takes the square root of an operand.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not parse.
    pub fn sqrt<'a>(&self, operand: impl Into<Operand<'a>>) -> Result<Quantity, UnitError> {
        self.unary(Operation::Sqrt, operand)
    }

    /// Tests two operands for equality. Operands of different dimensions are
    /// never equal.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes do not broadcast.
    pub fn equal<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        self.comparison(Operation::Equal, lhs, rhs)
    }

    /// Tests two operands for inequality.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes do not broadcast.
    pub fn not_equal<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        self.comparison(Operation::NotEqual, lhs, rhs)
    }

    /// Tests `lhs < rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn less<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        self.comparison(Operation::Less, lhs, rhs)
    }

    /// Tests `lhs <= rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn less_equal<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        self.comparison(Operation::LessEqual, lhs, rhs)
    }

    /// Tests `lhs > rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn greater<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        self.comparison(Operation::Greater, lhs, rhs)
    }

    /// Tests `lhs >= rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::IncompatibleUnits`] if the dimensions differ.
    pub fn greater_equal<'a>(
        &self,
        lhs: impl Into<Operand<'a>>,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<ArrayD<bool>, UnitError> {
        self.comparison(Operation::GreaterEqual, lhs, rhs)
    }

    /// Joins operands along the first axis, see [`sequence::concatenate`].
    ///
    /// # Errors
    ///
    /// See [`sequence::concatenate`].
    pub fn concatenate(&self, operands: &[Operand<'_>]) -> Result<Evaluated, UnitError> {
        sequence::concatenate(self, operands)
    }

    /// Finds where a sequence last falls to `target`, see
    /// [`sequence::threshold`].
    ///
    /// # Errors
    ///
    /// See [`sequence::threshold`].
    pub fn threshold(
        &self,
        sequence: &Quantity,
        target: &Quantity,
        start: usize,
    ) -> Result<Option<f64>, UnitError> {
        sequence::threshold(self, sequence, target, start)
    }

    /// Converts values in a legacy unit, see [`legacy::convert`].
    ///
    /// # Errors
    ///
    /// See [`legacy::convert`].
    pub fn legacy(&self, values: impl IntoValues, symbol: &str) -> Result<Quantity, UnitError> {
        legacy::convert(self, values, symbol)
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::new()
    }
}
