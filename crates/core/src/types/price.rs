//! Unit price of a product line.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// A strictly positive unit price with two decimal places.
///
/// Serialized as a JSON number (`1200.0`) so clients can send and receive
/// plain numeric prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Number of decimal places prices are stored with.
    pub const SCALE: u32 = 2;

    /// Largest price the store column (`NUMERIC(12, 2)`) can hold:
    /// 9 999 999 999.99.
    pub const MAX: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

    /// Create a price, rounding half-up to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidField` if the rounded amount is not
    /// greater than zero or exceeds [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        let rounded =
            amount.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rounded <= Decimal::ZERO {
            return Err(ValidationError::InvalidField {
                field: "price",
                reason: "must be greater than zero",
            });
        }
        if rounded > Self::MAX {
            return Err(ValidationError::InvalidField {
                field: "price",
                reason: "must not exceed 9999999999.99",
            });
        }
        Ok(Self(rounded))
    }

    /// Wrap a value read back from the database.
    #[must_use]
    pub const fn from_stored(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount as a decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
