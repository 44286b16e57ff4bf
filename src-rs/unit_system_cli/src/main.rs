//! Command line tool for parsing, converting and labelling SI units

use std::{error::Error, io, process::ExitCode};

use anstream::{ColorChoice, eprintln, println};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use unit_system::{Config, ConversionPolicy, Quantity, UnitSystem, table::DIMENSIONLESS};
use unit_system_label::LabelStyle;

use crate::command::{CliCommand, Commands};

mod command;
mod stylesheet;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = CliCommand::parse();
    if cli.no_colors {
        ColorChoice::Never.write_global();
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(error.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Parse {
            expression,
            substituted,
        } => {
            let units = UnitSystem::new();
            let parsed = units.parse(&expression)?;
            let display = units.resolve(&expression)?;

            print_field("scale", stylesheet::NUMBER.style(parsed.scale()));
            print_field("base units", stylesheet::UNIT.style(parsed.signature()));
            print_field("display unit", stylesheet::UNIT.style(display));
            if substituted {
                let raw = units.parser().substitute(&expression)?;
                print_field("substituted", raw);
            }
        }
        Commands::Convert {
            value,
            unit,
            to,
            lenient,
        } => {
            let policy = if lenient {
                ConversionPolicy::Lenient
            } else {
                ConversionPolicy::Strict
            };
            let units = UnitSystem::with_config(Config::new().with_conversion(policy));
            let quantity = Quantity::with_target(&units, value, &unit, &to)?;
            print_quantity(&quantity);
        }
        Commands::Legacy { value, symbol } => {
            let units = UnitSystem::new();
            let quantity = units.legacy(value, &symbol)?;
            print_quantity(&quantity);
        }
        Commands::Label {
            unit,
            symbol,
            caption,
        } => {
            // reject units that do not parse before formatting them
            UnitSystem::new().parse(&unit)?;

            let style = if caption {
                LabelStyle::Caption
            } else {
                LabelStyle::Si
            };
            let unit = (unit != DIMENSIONLESS).then_some(unit.as_str());
            let label = unit_system_label::format::axis_label(symbol.as_deref(), unit, style);
            println!("{label}");
        }
    }

    Ok(())
}

fn print_field(name: &str, value: impl std::fmt::Display) {
    let name = stylesheet::FIELD_NAME.style(format!("{name}:"));
    println!("{name} {value}");
}

fn print_quantity(quantity: &Quantity) {
    let value = quantity
        .value()
        .map_or_else(|| quantity.values().to_string(), |value| format!("{value:?}"));
    let value = stylesheet::NUMBER.style(value);

    match quantity.unit() {
        Some(unit) if unit != DIMENSIONLESS => println!("{value} {}", stylesheet::UNIT.style(unit)),
        _ => println!("{value}"),
    }
}

fn print_error(error: &dyn Error) {
    let kind = stylesheet::ERROR_COLOR.style("error");
    let message = format!("{kind}: {error}");
    eprintln!("{}", message.bold());
}
