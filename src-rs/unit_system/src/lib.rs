#![cfg_attr(doc, doc = include_str!("../README.md"))]
//! SI quantities with unit-safe arithmetic

pub mod algebra;
mod config;
pub mod engine;
mod error;
pub mod legacy;
pub mod parser;
pub mod predefined;
mod quantity;
pub mod resolve;
pub mod sequence;
pub mod signature;
mod system;
pub mod table;
pub mod util;

pub use algebra::Operation;
pub use config::{Config, ConversionPolicy, UnknownSymbolPolicy};
pub use engine::{Evaluated, Method, Operand};
pub use error::{ParseError, UnitError};
pub use parser::ParsedUnit;
pub use quantity::{IntoValues, Item, Quantity};
pub use signature::{BaseUnit, Signature};
pub use system::UnitSystem;
