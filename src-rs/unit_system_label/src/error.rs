//! Errors raised while building axis labels

use thiserror::Error;
use unit_system::UnitError;

/// An error produced while preparing a quantity for an axis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// The quantity could not be expressed in the requested unit.
    #[error("cannot show `{actual}` on an axis in `{requested}`")]
    Conversion {
        /// The unit requested for the axis
        requested: String,
        /// The unit of the quantity
        actual: String,
    },
    /// The unit of the quantity is invalid.
    #[error(transparent)]
    Unit(#[from] UnitError),
}
