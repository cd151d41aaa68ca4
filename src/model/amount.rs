//! Amount type for profit values that may carry a dollar sign or thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A signed decimal parsed from a spreadsheet-style cell.
///
/// Accepts `1234.5`, `-1234.5`, `$1,234.50`, `-$1,234.50` and `($1,234.50)` (accounting
/// negative). Displays without formatting so that exports stay machine-readable; use
/// [`Amount::pretty`] for the human-readable form.
///
/// ```
/// # use sales_board::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,250.00").unwrap();
/// assert_eq!(amount.to_string(), "-1250.00");
/// assert_eq!(amount.pretty(), "-$1,250.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Formats as `-$60,000.00`.
    pub fn pretty(&self) -> String {
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        let num = self.0.abs().to_f64().unwrap_or_default();
        format!("{sign}${}", format_num::format_num!(",.2", num))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Accounting style negatives: (50.00)
        let (negative, body) = match trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => match trimmed.strip_prefix('-') {
                Some(rest) => (true, rest.trim()),
                None => (false, trimmed),
            },
        };

        let digits = body.strip_prefix('$').unwrap_or(body).replace(',', "");
        let value = Decimal::from_str(&digits).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Amount::from_str("50.25").unwrap().value(), dec("50.25"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        assert_eq!(Amount::from_str("-$50.00").unwrap().value(), dec("-50.00"));
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_accounting_negative() {
        let amount = Amount::from_str("($12.50)").unwrap();
        assert_eq!(amount.value(), dec("-12.50"));
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(Amount::from_str("  17  ").unwrap().value(), dec("17"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_display_is_plain() {
        assert_eq!(Amount::from_str("$1,000.50").unwrap().to_string(), "1000.50");
    }

    #[test]
    fn test_pretty() {
        assert_eq!(Amount::new(dec("-60000")).pretty(), "-$60,000.00");
        assert_eq!(Amount::new(dec("12.5")).pretty(), "$12.50");
        assert_eq!(Amount::new(Decimal::ZERO).pretty(), "$0.00");
    }
}
