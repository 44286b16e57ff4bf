//! Terminal colors for command-line output

use owo_colors::Style;

pub const ERROR_COLOR: Style = Style::new().red();
pub const FIELD_NAME: Style = Style::new().bold();
pub const NUMBER: Style = Style::new().green();
pub const UNIT: Style = Style::new().cyan();
