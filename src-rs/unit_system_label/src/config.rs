//! Layout options for rendering axis labels

/// The layout of an axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// Symbol and unit separated by a slash, `$U\;/\;{\rm V}$`
    #[default]
    Si,
    /// Quantity name with the unit in parentheses, `${\rm Voltage\;(V)}$`
    Caption,
}

/// Configuration for label formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    style: LabelStyle,
}

impl Config {
    /// Creates a configuration with the SI label style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: LabelStyle::Si,
        }
    }

    /// Sets the label style.
    #[must_use]
    pub const fn with_style(mut self, style: LabelStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns the label style.
    #[must_use]
    pub const fn style(&self) -> LabelStyle {
        self.style
    }
}
