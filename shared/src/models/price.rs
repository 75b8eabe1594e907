//! Fixed-point price with exactly two fractional digits
//!
//! Prices arrive as untyped JSON (numbers or strings). They are parsed
//! straight from their decimal text into `rust_decimal::Decimal`, so no
//! binary floating point is involved. This is a formatting contract, not
//! a rounding algorithm: a value that needs more than two fractional
//! digits is rejected instead of rounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits in a formatted price
const DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("price is not numeric: {0:?}")]
    NotNumeric(String),
    #[error("price is negative: {0}")]
    Negative(String),
    #[error("price has more than two fractional digits: {0}")]
    TooPrecise(String),
    #[error("price cannot be held with two fractional digits: {0}")]
    OutOfRange(String),
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// Non-negative monetary amount, scale fixed at 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::from_parts(0, 0, 0, false, DECIMAL_PLACES));

    /// Parse a decimal literal such as `"12"`, `"9.1"` or `"9.10"`
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotNumeric(trimmed.to_string()))?;

        Self::from_decimal(value).map_err(|e| match e {
            PriceError::Negative(_) => PriceError::Negative(trimmed.to_string()),
            PriceError::TooPrecise(_) => PriceError::TooPrecise(trimmed.to_string()),
            PriceError::OutOfRange(_) => PriceError::OutOfRange(trimmed.to_string()),
            other => other,
        })
    }

    /// Build from an exact decimal, rejecting negatives and sub-cent precision
    pub fn from_decimal(value: Decimal) -> Result<Self, PriceError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PriceError::Negative(value.to_string()));
        }
        if value.normalize().scale() > DECIMAL_PLACES {
            return Err(PriceError::TooPrecise(value.to_string()));
        }
        let mut scaled = value.normalize();
        // rescale keeps a smaller scale when the mantissa has no room left
        scaled.rescale(DECIMAL_PLACES);
        if scaled.scale() != DECIMAL_PLACES {
            return Err(PriceError::OutOfRange(value.to_string()));
        }
        Ok(Self(scaled))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity (line totals)
    pub fn times(&self, quantity: u32) -> Result<Price, PriceError> {
        let total = self
            .0
            .checked_mul(Decimal::from(quantity))
            .ok_or(PriceError::Overflow)?;
        Self::from_decimal(total)
    }

    pub fn checked_add(&self, other: Price) -> Result<Price, PriceError> {
        let sum = self.0.checked_add(other.0).ok_or(PriceError::Overflow)?;
        Self::from_decimal(sum)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // scale is always DECIMAL_PLACES, Decimal's Display keeps trailing zeros
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Price::parse(&raw).map_err(serde::de::Error::custom)
    }
}
