//! Builds the expression tree of a unit expression from its tokens
//!
//! ```text
//! expr    := factor (("*" | "/") factor)*
//! factor  := primary power?
//! primary := number | atom | "(" expr ")" | "sqrt" "(" expr ")"
//! ```
//!
//! Multiplication and division share a precedence level and associate to the
//! left, so `m/s*kg` is `(m/s)*kg`.

use std::fmt;

use crate::{
    error::ParseError,
    parser::token::{Exponent, Token, TokenKind},
};

/// A unit expression as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitExpr<'a> {
    /// A unit symbol
    Atom(&'a str),
    /// A numeric literal
    Number(&'a str),
    /// A parenthesized expression
    Group(Box<Self>),
    /// The square root of an expression
    Sqrt(Box<Self>),
    /// `lhs * rhs`
    Multiply(Box<Self>, Box<Self>),
    /// `lhs / rhs`
    Divide(Box<Self>, Box<Self>),
    /// `base ** exponent`
    Power(Box<Self>, Exponent),
}

impl fmt::Display for UnitExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) | Self::Number(text) => f.write_str(text),
            Self::Group(inner) => write!(f, "({inner})"),
            Self::Sqrt(inner) => write!(f, "sqrt({inner})"),
            Self::Multiply(lhs, rhs) => write!(f, "{lhs}*{rhs}"),
            Self::Divide(lhs, rhs) => write!(f, "{lhs}/{rhs}"),
            Self::Power(base, exponent) => write!(f, "{base}**{exponent}"),
        }
    }
}

/// Parses the tokens of `expression` into an expression tree.
///
/// # Errors
///
/// Returns a syntax error pointing at the first token that does not fit the
/// grammar, or at the end of the expression if it is incomplete.
pub fn parse<'a>(expression: &str, tokens: &[Token<'a>]) -> Result<UnitExpr<'a>, ParseError> {
    let mut stream = TokenStream {
        expression,
        tokens,
        position: 0,
    };

    let parsed = expr(&mut stream)?;

    if stream.peek().is_some() {
        return Err(stream.error("`*`, `/` or the end of the expression"));
    }

    Ok(parsed)
}

struct TokenStream<'s, 'a> {
    expression: &'s str,
    tokens: &'s [Token<'a>],
    position: usize,
}

impl<'s, 'a> TokenStream<'s, 'a> {
    fn peek(&self) -> Option<&'s Token<'a>> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'s Token<'a>> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    fn expect(
        &mut self,
        kind: TokenKind<'static>,
        expected: &str,
    ) -> Result<&'s Token<'a>, ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.position += 1;
                Ok(token)
            }
            _ => Err(self.error(expected)),
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError::Syntax {
            expression: self.expression.to_owned(),
            offset: self.peek().map_or(self.expression.len(), |token| token.offset),
            expected: expected.to_owned(),
        }
    }
}

fn expr<'a>(stream: &mut TokenStream<'_, 'a>) -> Result<UnitExpr<'a>, ParseError> {
    let mut lhs = factor(stream)?;

    loop {
        let combine = match stream.peek().map(|token| token.kind) {
            Some(TokenKind::Star) => UnitExpr::Multiply,
            Some(TokenKind::Slash) => UnitExpr::Divide,
            _ => return Ok(lhs),
        };
        stream.advance();

        let rhs = factor(stream)?;
        lhs = combine(Box::new(lhs), Box::new(rhs));
    }
}

fn factor<'a>(stream: &mut TokenStream<'_, 'a>) -> Result<UnitExpr<'a>, ParseError> {
    const EXPECTED_PRIMARY: &str = "a unit symbol, number, `sqrt` or `(`";

    let Some(token) = stream.peek() else {
        return Err(stream.error(EXPECTED_PRIMARY));
    };

    // the token holding the power suffix is the last token of the primary
    let (primary, last) = match token.kind {
        TokenKind::Atom(symbol) => {
            stream.advance();
            (UnitExpr::Atom(symbol), token)
        }
        TokenKind::Number(literal) => {
            stream.advance();
            (UnitExpr::Number(literal), token)
        }
        TokenKind::ParenLeft => {
            stream.advance();
            let inner = expr(stream)?;
            let close = stream.expect(TokenKind::ParenRight, "`)`")?;
            (UnitExpr::Group(Box::new(inner)), close)
        }
        TokenKind::Sqrt => {
            stream.advance();
            stream.expect(TokenKind::ParenLeft, "`(`")?;
            let inner = expr(stream)?;
            let close = stream.expect(TokenKind::ParenRight, "`)`")?;
            (UnitExpr::Sqrt(Box::new(inner)), close)
        }
        TokenKind::Star | TokenKind::Slash | TokenKind::ParenRight => {
            return Err(stream.error(EXPECTED_PRIMARY));
        }
    };

    Ok(match last.power {
        Some(exponent) => UnitExpr::Power(Box::new(primary), exponent),
        None => primary,
    })
}
