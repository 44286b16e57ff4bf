//! LaTeX formatting of quantity symbols and unit expressions

use crate::{config::LabelStyle, symbols};

/// The symbol used when a quantity has neither its own nor a standard one.
pub const FALLBACK_SYMBOL: &str = "q";

/// Formats a unit expression for use inside `{\rm ...}`.
///
/// Powers become superscripts and products become `\cdot`. Compound
/// expressions are parenthesized unless they already start with a
/// parenthesis.
#[must_use]
pub fn format_unit(unit: &str) -> String {
    let formatted = latex_unit(unit);
    if is_compound(unit) && !unit.starts_with('(') {
        format!("({formatted})")
    } else {
        formatted
    }
}

fn latex_unit(unit: &str) -> String {
    unit.replace("**", "^").replace('*', r"\cdot ")
}

fn is_compound(unit: &str) -> bool {
    unit.contains(['*', '/'])
}

/// Formats a quantity symbol such as `v_max**2` as `v_{\rm max}^2`.
///
/// A symbol already written as `$...$` is used as is.
#[must_use]
pub fn format_symbol(symbol: &str) -> String {
    if let Some(math) = symbol
        .strip_prefix('$')
        .and_then(|rest| rest.strip_suffix('$'))
    {
        return math.to_owned();
    }

    let (base, power) = symbol.split_once("**").unwrap_or((symbol, ""));
    let base = match base.split_once('_') {
        Some((name, subscript)) => format!(r"{name}_{{\rm {subscript}}}"),
        None => base.to_owned(),
    };

    if power.is_empty() {
        base
    } else {
        format!("{base}^{power}")
    }
}

/// Builds the axis label for a quantity symbol and unit.
///
/// `unit` is `None` for quantities without a unit or with the
/// dimensionless unit `1`; the label then has no unit part.
#[must_use]
pub fn axis_label(symbol: Option<&str>, unit: Option<&str>, style: LabelStyle) -> String {
    match style {
        LabelStyle::Si => {
            let symbol = symbol.map_or_else(
                || {
                    unit.and_then(symbols::lookup)
                        .map_or(FALLBACK_SYMBOL, |standard| standard.symbol)
                        .to_owned()
                },
                format_symbol,
            );
            match unit {
                Some(unit) => format!(r"${symbol}\;/\;{{\rm {}}}$", format_unit(unit)),
                None => format!("${symbol}$"),
            }
        }
        LabelStyle::Caption => {
            let name = unit
                .and_then(symbols::lookup)
                .map_or("", |standard| standard.name);
            match unit {
                Some(unit) => format!(r"${{\rm {name}\;({})}}$", latex_unit(unit)),
                None => format!(r"${{\rm {name}}}$"),
            }
        }
    }
}
