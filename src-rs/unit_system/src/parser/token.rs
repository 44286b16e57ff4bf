//! Lexer for unit expressions
//!
//! The lexer splits an expression into atoms, numbers, operators and
//! parentheses. A `**` power suffix is not a token of its own: it is kept on
//! the atom, number or closing parenthesis it follows, so `s**-2` is a single
//! token.
//!
//! All token parsers consume trailing whitespace.

use std::fmt;

use nom::{
    IResult, Parser as _,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, one_of, satisfy, space0},
    combinator::{all_consuming, consumed, not, opt, peek, recognize, value},
    multi::many0,
    sequence::{delimited, preceded, terminated},
};
use nom_locate::LocatedSpan;
use num_rational::Rational64;
use num_traits::CheckedDiv;

use crate::{error::ParseError, signature::bounded_exponent};

/// A span of the expression being lexed.
pub type InputSpan<'a> = LocatedSpan<&'a str>;

type Result<'a, O> = IResult<InputSpan<'a>, O>;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// A unit symbol, possibly prefixed, such as `km` or `°C`
    Atom(&'a str),
    /// A numeric literal, such as `1000` or `1E-3`
    Number(&'a str),
    /// The `sqrt` function name
    Sqrt,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    ParenLeft,
    /// `)`
    ParenRight,
}

impl TokenKind<'_> {
    const fn accepts_power(self) -> bool {
        matches!(self, Self::Atom(_) | Self::Number(_) | Self::ParenRight)
    }
}

/// An exact rational exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exponent(Rational64);

impl Exponent {
    /// Creates an exponent.
    #[must_use]
    pub const fn new(value: Rational64) -> Self {
        Self(value)
    }

    /// Returns the exponent value.
    #[must_use]
    pub const fn value(self) -> Rational64 {
        self.0
    }

    fn from_parts(numerator: &str, denominator: Option<&str>) -> Option<Self> {
        let numerator = decimal_to_rational(numerator)?;
        let exponent = match denominator {
            Some(denominator) => {
                let denominator: i64 = denominator.parse().ok()?;
                numerator.checked_div(&Rational64::from_integer(denominator))?
            }
            None => numerator,
        };
        bounded_exponent(exponent).map(Self)
    }
}

impl fmt::Display for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

/// A token together with its power suffix and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// What was matched
    pub kind: TokenKind<'a>,
    /// The `**` suffix following the token, if any
    pub power: Option<Exponent>,
    /// Byte offset of the token in the expression
    pub offset: usize,
}

struct RawPower<'a> {
    text: &'a str,
    numerator: &'a str,
    denominator: Option<&'a str>,
}

struct RawToken<'a> {
    kind: TokenKind<'a>,
    power: Option<RawPower<'a>>,
    offset: usize,
}

/// Splits a unit expression into tokens.
///
/// # Errors
///
/// Returns a syntax error at the first character that does not start a
/// token, or an exponent error if a power suffix is not a usable rational.
pub fn tokenize(expression: &str) -> std::result::Result<Vec<Token<'_>>, ParseError> {
    let input = InputSpan::new(expression);
    let raw_tokens = match all_consuming(preceded(space0, many0(lexeme))).parse(input) {
        Ok((_rest, raw_tokens)) => raw_tokens,
        Err(nom::Err::Error(error) | nom::Err::Failure(error)) => {
            return Err(ParseError::Syntax {
                expression: expression.to_owned(),
                offset: error.input.location_offset(),
                expected: "a unit symbol, number, operator or parenthesis".to_owned(),
            });
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(ParseError::Syntax {
                expression: expression.to_owned(),
                offset: expression.len(),
                expected: "more input".to_owned(),
            });
        }
    };

    raw_tokens
        .into_iter()
        .map(|raw| {
            let power = raw
                .power
                .map(|power| {
                    Exponent::from_parts(power.numerator, power.denominator).ok_or_else(|| {
                        ParseError::InvalidExponent {
                            exponent: power.text.to_owned(),
                        }
                    })
                })
                .transpose()?;

            Ok(Token {
                kind: raw.kind,
                power,
                offset: raw.offset,
            })
        })
        .collect()
}

fn lexeme(input: InputSpan<'_>) -> Result<'_, RawToken<'_>> {
    let offset = input.location_offset();
    let (input, kind) = terminated(token_kind, space0).parse(input)?;

    if !kind.accepts_power() {
        return Ok((
            input,
            RawToken {
                kind,
                power: None,
                offset,
            },
        ));
    }

    let (input, power) = opt(terminated(
        preceded((tag("**"), space0), power_suffix),
        space0,
    ))
    .parse(input)?;

    Ok((
        input,
        RawToken {
            kind,
            power,
            offset,
        },
    ))
}

fn token_kind(input: InputSpan<'_>) -> Result<'_, TokenKind<'_>> {
    alt((
        number.map(|span| TokenKind::Number(*span.fragment())),
        value(
            TokenKind::Sqrt,
            terminated(tag("sqrt"), peek((space0, char('(')))),
        ),
        atom.map(|span| TokenKind::Atom(*span.fragment())),
        value(TokenKind::Star, terminated(char('*'), not(char('*')))),
        value(TokenKind::Slash, char('/')),
        value(TokenKind::ParenLeft, char('(')),
        value(TokenKind::ParenRight, char(')')),
    ))
    .parse(input)
}

/// Parses a numeric literal such as `60`, `0.5` or `1E-3`.
fn number(input: InputSpan<'_>) -> Result<'_, InputSpan<'_>> {
    recognize((
        digit1,
        opt((char('.'), digit1)),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '°' | '\'' | '"' | '_')
}

fn is_atom_start(c: char) -> bool {
    is_atom_char(c) && !c.is_ascii_digit()
}

/// Parses a unit symbol, such as `kg`, `µs`, `°C` or `'`.
fn atom(input: InputSpan<'_>) -> Result<'_, InputSpan<'_>> {
    recognize((satisfy(is_atom_start), take_while(is_atom_char))).parse(input)
}

fn signed_number(input: InputSpan<'_>) -> Result<'_, InputSpan<'_>> {
    recognize((opt(one_of("+-")), digit1, opt((char('.'), digit1)))).parse(input)
}

/// Parses the exponent after `**`: either a signed number or a
/// parenthesized fraction such as `(-1/2)`.
fn power_suffix(input: InputSpan<'_>) -> Result<'_, RawPower<'_>> {
    let bare = signed_number.map(|span| RawPower {
        text: *span.fragment(),
        numerator: *span.fragment(),
        denominator: None,
    });

    let fraction = consumed(delimited(
        (char('('), space0),
        (
            terminated(signed_number, space0),
            opt(preceded((char('/'), space0), terminated(digit1, space0))),
        ),
        char(')'),
    ))
    .map(|(text, (numerator, denominator))| RawPower {
        text: *text.fragment(),
        numerator: *numerator.fragment(),
        denominator: denominator.map(|span| *span.fragment()),
    });

    alt((bare, fraction)).parse(input)
}

/// Converts a decimal such as `-2` or `0.5` into an exact rational.
fn decimal_to_rational(text: &str) -> Option<Rational64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let numerator: i64 = format!("{integer}{fraction}").parse().ok()?;
    let denominator = 10_i64.checked_pow(u32::try_from(fraction.len()).ok()?)?;
    let value = bounded_exponent(Rational64::new(numerator, denominator))?;

    Some(if negative { -value } else { value })
}
