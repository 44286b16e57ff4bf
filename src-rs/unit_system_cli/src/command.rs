use clap::{Parser, Subcommand};

/// SI unit CLI
#[derive(Parser)]
#[command(name = "unit-system")]
#[command(version, about = "Parse, convert and label SI units", long_about = None)]
pub struct CliCommand {
    /// Disable colors in the output
    #[arg(long, global = true)]
    pub no_colors: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a unit expression into its scale and base units
    Parse {
        /// The unit expression, such as `kN*mm`
        #[arg(value_name = "EXPR")]
        expression: String,

        /// Also print the expression with every unit replaced by base units
        #[arg(long)]
        substituted: bool,
    },
    /// Create a quantity and convert it
    Convert {
        /// The numeric value
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// The unit of the value
        #[arg(value_name = "UNIT")]
        unit: String,

        /// The unit to convert to, or `auto` for the display unit
        #[arg(long, default_value = "auto")]
        to: String,

        /// Keep uncanceled factors instead of failing on a dimension mismatch
        #[arg(long)]
        lenient: bool,
    },
    /// Convert a value in a non-SI unit, such as `ft` or `°F`, to SI
    Legacy {
        /// The numeric value
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// The legacy unit symbol
        #[arg(value_name = "SYMBOL")]
        symbol: String,
    },
    /// Print the axis label for a unit
    Label {
        /// The unit expression
        #[arg(value_name = "UNIT")]
        unit: String,

        /// The quantity symbol, such as `v_max**2`
        #[arg(long)]
        symbol: Option<String>,

        /// Use the caption style instead of the SI style
        #[arg(long)]
        caption: bool,
    },
}
