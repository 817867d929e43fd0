//! Value Objects for the store ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Barcode value object.
///
/// Spreadsheets write `N/A` for products without a barcode, so that literal
/// (and the empty string) never becomes a stored barcode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    pub const PLACEHOLDER: &'static str = "N/A";

    /// Returns `None` for empty or placeholder input.
    pub fn parse(value: impl AsRef<str>) -> Option<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() || value == Self::PLACEHOLDER { return None; }
        Some(Self(value.to_string()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Money value object. Amounts are soles, never negative, and entered amounts
/// stay at or below `Money::MAX_SOLES`. Arithmetic saturates instead of overflowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    /// Largest amount accepted from input, in whole soles.
    pub const MAX_SOLES: i64 = 1_000_000_000;

    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(MoneyError::Negative); }
        if amount > Decimal::from(Self::MAX_SOLES) { return Err(MoneyError::TooLarge); }
        Ok(Self(amount))
    }
    pub fn from_f64(amount: f64) -> Result<Self, MoneyError> {
        if !amount.is_finite() { return Err(MoneyError::NotANumber); }
        let d = Decimal::try_from(amount).map_err(|_| MoneyError::NotANumber)?;
        Self::new(d.round_dp(2))
    }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn add(&self, other: &Money) -> Money { Money(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: u32) -> Money { Money(self.0.saturating_mul(Decimal::from(qty))) }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self { value.0 }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::ZERO, |acc, m| acc.add(&m)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "S/.{:.2}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum MoneyError { Negative, NotANumber, TooLarge }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative => write!(f, "amount cannot be negative"),
            Self::NotANumber => write!(f, "amount is not a number"),
            Self::TooLarge => write!(f, "amount exceeds {} soles", Money::MAX_SOLES),
        }
    }
}

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
}

/// Email value object. Comparison ignores ASCII case.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Self { Self(value.into().trim().to_string()) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn matches(&self, other: &str) -> bool { self.0.eq_ignore_ascii_case(other.trim()) }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool { self.matches(&other.0) }
}
impl Eq for Email {}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_barcode_placeholder_clears() {
        assert_eq!(Barcode::parse("N/A"), None);
        assert_eq!(Barcode::parse("  "), None);
        assert_eq!(Barcode::parse(" 7750123 ").unwrap().as_str(), "7750123");
    }
    #[test]
    fn test_money_rejects_negative() {
        assert_eq!(Money::new(Decimal::new(-1, 0)), Err(MoneyError::Negative));
        assert_eq!(Money::from_f64(f64::NAN), Err(MoneyError::NotANumber));
        let m = Money::from_f64(12.5).unwrap();
        assert_eq!(m.multiply(3).amount(), Decimal::new(375, 1));
        assert_eq!(m.to_string(), "S/.12.50");
    }
    #[test]
    fn test_money_capped_and_saturating() {
        assert_eq!(Money::from_f64(1e28), Err(MoneyError::TooLarge));
        assert!(serde_json::from_value::<Money>(serde_json::json!(1e28)).is_err());
        let top = Money::new(Decimal::from(Money::MAX_SOLES)).unwrap();
        let line = top.multiply(u32::MAX);
        assert_eq!(line.amount(), Decimal::from(Money::MAX_SOLES) * Decimal::from(u32::MAX));
        let huge: Money = std::iter::repeat(line).take(100_000).sum();
        assert!(huge >= line);
    }
    #[test]
    fn test_money_serializes_as_number() {
        let m = Money::from_f64(6.5).unwrap();
        assert_eq!(serde_json::to_value(m).unwrap(), serde_json::json!(6.5));
        assert!(serde_json::from_value::<Money>(serde_json::json!(-2.0)).is_err());
    }
    #[test]
    fn test_email_case_insensitive() {
        assert_eq!(Email::new("Diana@Admin.com"), Email::new("diana@admin.com"));
        assert!(Email::new("a@b.com").matches(" A@B.COM "));
    }
}
