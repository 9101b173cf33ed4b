//! FILENAME: core/report-model/src/amount.rs
//! PURPOSE: Exact decimal amounts and their fixed-precision rendering.
//! CONTEXT: Source systems hand us costs and metrics as decimal strings. They are
//! parsed once at the boundary into `Amount`, summed exactly, and rendered back
//! through a `DecimalFormat` so every cell in a table shares one precision.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Largest number of fractional digits the underlying decimal can carry.
pub const MAX_PRECISION: u32 = 28;

// ============================================================================
// AMOUNT
// ============================================================================

/// An exact decimal quantity (cost, uptime percentage, release count...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Parses a decimal string such as `"-1.01"`, `" 3.5 "` or `"1e-3"`.
    /// Empty or non-numeric text is an error, never a silent zero.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let trimmed = text.trim();
        // rust_decimal skips '_' as a digit separator; source values never carry one
        if trimmed.is_empty() || trimmed.contains('_') {
            return Err(ModelError::InvalidDecimal(text.to_string()));
        }

        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Amount)
            .map_err(|_| ModelError::InvalidDecimal(text.to_string()))
    }

    /// Exact addition. Only fails when the result leaves the 96-bit range.
    pub fn checked_add(self, other: Amount) -> Result<Amount, ModelError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| ModelError::Overflow {
                left: self.0.to_string(),
                right: other.0.to_string(),
            })
    }

    /// Sums a sequence of amounts exactly.
    pub fn sum<'a, I>(amounts: I) -> Result<Amount, ModelError>
    where
        I: IntoIterator<Item = &'a Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, value| acc.checked_add(*value))
    }

    /// Divides by a count, rounding the quotient to `precision` places.
    pub fn div_count(self, count: usize, precision: u32) -> Result<Amount, ModelError> {
        if count == 0 {
            return Err(ModelError::EmptyAverage);
        }
        let quotient = self
            .0
            .checked_div(Decimal::from(count))
            .ok_or_else(|| ModelError::Overflow {
                left: self.0.to_string(),
                right: count.to_string(),
            })?;
        Ok(Amount(quotient).round_to(precision))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Rounds half away from zero. A result of zero never carries a sign.
    pub fn round_to(self, precision: u32) -> Amount {
        let mut rounded = self
            .0
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        Amount(rounded)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl TryFrom<String> for Amount {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::parse(&value)
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// DECIMAL FORMAT
// ============================================================================

/// Fixed-precision rendering shared by every cell of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalFormat {
    /// Number of fractional digits, e.g. 4 renders zero as `"0.0000"`.
    pub precision: u32,
}

impl DecimalFormat {
    pub const DEFAULT_PRECISION: u32 = 4;

    pub fn new(precision: u32) -> Result<Self, ModelError> {
        if precision > MAX_PRECISION {
            return Err(ModelError::PrecisionTooLarge(precision));
        }
        Ok(DecimalFormat { precision })
    }

    pub fn round(&self, amount: Amount) -> Amount {
        amount.round_to(self.precision)
    }

    /// Renders with exactly `precision` fractional digits.
    ///
    /// `rescale` stops short when the integer digits leave no room for the full
    /// scale. The rounded value has at most `precision` fractional digits, so
    /// the missing ones are zeros and get appended to the text.
    pub fn format(&self, amount: Amount) -> String {
        let mut rounded = self.round(amount).0;
        rounded.rescale(self.precision);
        let mut text = rounded.to_string();

        let scale = rounded.scale();
        if scale < self.precision {
            if scale == 0 {
                text.push('.');
            }
            text.extend(std::iter::repeat('0').take((self.precision - scale) as usize));
        }
        text
    }

    /// The string every empty cell holds.
    pub fn zero_sentinel(&self) -> String {
        self.format(Amount::ZERO)
    }

    pub fn is_zero_sentinel(&self, cell: &str) -> bool {
        cell == self.zero_sentinel()
    }
}

impl Default for DecimalFormat {
    fn default() -> Self {
        DecimalFormat {
            precision: Self::DEFAULT_PRECISION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(text: &str) -> Amount {
        Amount::parse(text).unwrap()
    }

    #[test]
    fn parses_signed_and_padded_values() {
        assert_eq!(amount("-1.01"), Amount::from(Decimal::new(-101, 2)));
        assert_eq!(amount(" 3.01 "), Amount::from(Decimal::new(301, 2)));
        assert_eq!(amount("10"), Amount::from(10));
    }

    #[test]
    fn rejects_digit_separators() {
        assert_eq!(
            Amount::parse("1_000"),
            Err(ModelError::InvalidDecimal("1_000".to_string()))
        );
        assert_eq!(
            Amount::parse("1__0.5_"),
            Err(ModelError::InvalidDecimal("1__0.5_".to_string()))
        );
        assert!(Amount::parse("1_0e2").is_err());
    }

    #[test]
    fn parses_scientific_notation() {
        assert_eq!(amount("1e-3"), Amount::from(Decimal::new(1, 3)));
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert_eq!(
            Amount::parse("ten"),
            Err(ModelError::InvalidDecimal("ten".to_string()))
        );
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse("   ").is_err());
        assert!(Amount::parse("NaN").is_err());
    }

    #[test]
    fn addition_is_exact() {
        // 0.1 + 0.2 drifts in binary floating point
        let sum = amount("0.1").checked_add(amount("0.2")).unwrap();
        assert_eq!(sum, amount("0.3"));

        let total = Amount::sum(&[amount("-1.01"), amount("3.01"), Amount::ZERO]).unwrap();
        assert_eq!(total, amount("2"));
    }

    #[test]
    fn format_pads_to_precision() {
        let format = DecimalFormat::default();
        assert_eq!(format.format(amount("-1.01")), "-1.0100");
        assert_eq!(format.format(amount("10")), "10.0000");
        assert_eq!(format.format(amount("18698.651307699")), "18698.6513");
        assert_eq!(format.zero_sentinel(), "0.0000");
    }

    #[test]
    fn format_rounds_half_away_from_zero() {
        let format = DecimalFormat::new(2).unwrap();
        assert_eq!(format.format(amount("0.125")), "0.13");
        assert_eq!(format.format(amount("-0.125")), "-0.13");
    }

    #[test]
    fn tiny_negative_values_render_as_plain_zero() {
        let format = DecimalFormat::default();
        assert_eq!(format.format(amount("-0.00001")), "0.0000");
        assert!(format.is_zero_sentinel(&format.format(amount("-0.00001"))));
    }

    #[test]
    fn precision_zero_has_no_decimal_point() {
        let format = DecimalFormat::new(0).unwrap();
        assert_eq!(format.format(amount("2.5")), "3");
        assert_eq!(format.zero_sentinel(), "0");
    }

    #[test]
    fn format_keeps_full_precision_for_wide_values() {
        let format = DecimalFormat::default();
        assert_eq!(
            format.format(amount("79228162514264337593543950")),
            "79228162514264337593543950.0000"
        );

        let format = DecimalFormat::new(MAX_PRECISION).unwrap();
        let text = format.format(amount("1000"));
        assert_eq!(text, format!("1000.{}", "0".repeat(28)));
        assert_eq!(text.split('.').nth(1).map(str::len), Some(28));
        assert_eq!(
            format.format(amount("-12.5")),
            format!("-12.5{}", "0".repeat(27))
        );
    }

    #[test]
    fn precision_is_capped() {
        assert_eq!(
            DecimalFormat::new(29),
            Err(ModelError::PrecisionTooLarge(29))
        );
    }

    #[test]
    fn div_count_rounds_the_mean() {
        let mean = amount("100").div_count(3, 4).unwrap();
        assert_eq!(mean, amount("33.3333"));
        assert_eq!(amount("1").div_count(0, 4), Err(ModelError::EmptyAverage));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&amount("3.51")).unwrap();
        assert_eq!(json, "\"3.51\"");
        let back: Amount = serde_json::from_str("\"-4.72\"").unwrap();
        assert_eq!(back, amount("-4.72"));
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }
}
