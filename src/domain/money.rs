use thiserror::Error;

/// Balances and amounts are held as integer cents, so 1000.00 = 100000 cents.
pub type Cents = i64;

/// Format cents as a two-decimal string.
/// Example: 150000 -> "1500.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse an amount typed by the user into cents.
/// Example: "1500.00" -> 150000, "12.5" -> 1250, "100" -> 10000
///
/// More than two decimal places is an error, never a silent truncation.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let amount = DecimalParts::split(input)?;
    if amount.decimals.len() > 2 {
        return Err(ParseCentsError::TooManyDecimals(amount.input.to_string()));
    }
    amount.to_cents(false)
}

/// Parse a balance read back from the data file into cents.
///
/// Extra decimal places are rounded half-up to the nearest cent and
/// exponent forms such as `1.0E7` are accepted.
pub fn parse_stored_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let trimmed = input.trim();
    if trimmed.contains(['e', 'E']) {
        return parse_exponent_cents(trimmed);
    }
    DecimalParts::split(trimmed)?.to_cents(true)
}

fn parse_exponent_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let value: f64 = input
        .parse()
        .map_err(|_| ParseCentsError::InvalidFormat(input.to_string()))?;
    let cents = (value * 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, which itself does not fit
    if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
        return Err(ParseCentsError::OutOfRange(input.to_string()));
    }
    Ok(cents as Cents)
}

/// A plain decimal number split into sign, integer digits and fraction digits.
struct DecimalParts<'a> {
    input: &'a str,
    negative: bool,
    units: &'a str,
    decimals: &'a str,
}

impl<'a> DecimalParts<'a> {
    fn split(input: &'a str) -> Result<Self, ParseCentsError> {
        let input = input.trim();
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };
        let (units, decimals) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if units.is_empty() && decimals.is_empty() {
            return Err(ParseCentsError::InvalidFormat(input.to_string()));
        }
        if !all_digits(units) || !all_digits(decimals) {
            return Err(ParseCentsError::InvalidFormat(input.to_string()));
        }

        Ok(Self {
            input,
            negative,
            units,
            decimals,
        })
    }

    /// Whole cents; the third decimal decides rounding when `round` is set.
    fn to_cents(&self, round: bool) -> Result<Cents, ParseCentsError> {
        let out_of_range = || ParseCentsError::OutOfRange(self.input.to_string());

        let units: i64 = if self.units.is_empty() {
            0
        } else {
            self.units.parse().map_err(|_| out_of_range())?
        };

        let digits = self.decimals.as_bytes();
        let digit = |i: usize| digits.get(i).map_or(0, |d| i64::from(d - b'0'));
        let mut fraction = digit(0) * 10 + digit(1);
        if round && digit(2) >= 5 {
            fraction += 1;
        }

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(out_of_range)?;

        Ok(if self.negative { -cents } else { cents })
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("invalid amount '{0}', expected a number like 1500 or 1500.50")]
    InvalidFormat(String),

    #[error("amount '{0}' has more than two decimal places")]
    TooManyDecimals(String),

    #[error("amount '{0}' is too large")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(150000), "1500.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("1500.00"), Ok(150000));
        assert_eq!(parse_cents("5000"), Ok(500000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("7."), Ok(700));
        assert_eq!(parse_cents(" 2000 "), Ok(200000));
        assert_eq!(parse_cents("+25"), Ok(2500));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
    }

    #[test]
    fn test_parse_cents_rejects_extra_decimals() {
        assert_eq!(
            parse_cents("1500.999"),
            Err(ParseCentsError::TooManyDecimals("1500.999".to_string()))
        );
        assert!(matches!(
            parse_cents("0.001"),
            Err(ParseCentsError::TooManyDecimals(_))
        ));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("").is_err());
        assert!(parse_cents(".").is_err());
        assert!(parse_cents("12.34.56").is_err());
        assert!(parse_cents("12.-3").is_err());
        assert!(parse_cents("1e3").is_err());
        assert!(parse_cents("--5").is_err());
    }

    #[test]
    fn test_parse_cents_overflow() {
        assert!(matches!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_cents("999999999999999999"),
            Err(ParseCentsError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_stored_cents_rounds_half_up() {
        assert_eq!(parse_stored_cents("1999.9999999999998"), Ok(200000));
        assert_eq!(parse_stored_cents("1500.994"), Ok(150099));
        assert_eq!(parse_stored_cents("1500.995"), Ok(150100));
        assert_eq!(parse_stored_cents("1500.0"), Ok(150000));
        assert_eq!(parse_stored_cents("5000"), Ok(500000));
    }

    #[test]
    fn test_parse_stored_cents_accepts_exponent() {
        assert_eq!(parse_stored_cents("1.0E7"), Ok(1_000_000_000));
        assert_eq!(parse_stored_cents("1.23456789E7"), Ok(1_234_567_890));
        assert_eq!(parse_stored_cents("2.5e3"), Ok(250_000));
        assert!(matches!(
            parse_stored_cents("1.0E300"),
            Err(ParseCentsError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_stored_cents("1.0Ex"),
            Err(ParseCentsError::InvalidFormat(_))
        ));
    }
}
