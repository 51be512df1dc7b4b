//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as JSON numbers (`109.95`) while persisted carts
//! store them as decimal strings (`"109.95"`). [`Price`] accepts both and
//! always serializes as a string so a save/load cycle never loses precision.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount was below zero.
    #[error("price must not be negative (got {0})")]
    Negative(Decimal),

    /// The input could not be read as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative amount in the store currency (USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The largest representable price.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Price of `quantity` units, saturating at [`Price::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self * quantity
    }

    /// Price of `quantity` units, or `None` if it cannot be represented.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two prices, or `None` if it cannot be represented.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(PriceError::Invalid(value.to_string()));
        }
        // The shortest round-trip representation keeps 109.95 as 109.95.
        value.to_string().parse()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Price::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::from_cents(-1),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::from_cents(0).is_ok());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(1999).unwrap().to_string(), "$19.99");
        assert_eq!("10".parse::<Price>().unwrap().to_string(), "$10.00");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("109.95").unwrap();
        let from_string: Price = serde_json::from_str("\"109.95\"").unwrap();
        let from_int: Price = serde_json::from_str("10").unwrap();

        assert_eq!(from_number, from_string);
        assert_eq!(from_number, Price::from_cents(10995).unwrap());
        assert_eq!(from_int, Price::from_cents(1000).unwrap());
    }

    #[test]
    fn test_deserialize_rejects_negative_and_garbage() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
        assert!(serde_json::from_str::<Price>("\"cheap\"").is_err());
        assert!(serde_json::from_str::<Price>("null").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1050).unwrap()).unwrap();
        assert_eq!(json, "\"10.50\"");
    }

    #[test]
    fn test_arithmetic() {
        let unit = Price::from_cents(250).unwrap();
        assert_eq!(unit.times(4), Price::from_cents(1000).unwrap());

        let total: Price = [unit, unit.times(2)].into_iter().sum();
        assert_eq!(total, Price::from_cents(750).unwrap());
    }

    #[test]
    fn test_arithmetic_saturates_at_max() {
        assert_eq!(Price::MAX.times(2), Price::MAX);
        assert_eq!(Price::MAX + Price::from_cents(1).unwrap(), Price::MAX);
        let total: Price = [Price::MAX, Price::MAX].into_iter().sum();
        assert_eq!(total, Price::MAX);

        assert_eq!(Price::MAX.checked_times(2), None);
        assert_eq!(Price::MAX.checked_add(Price::MAX), None);
        assert_eq!(Price::MAX.checked_times(1), Some(Price::MAX));
    }
}
