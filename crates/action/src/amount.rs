//! Conversion between human decimal amounts and 18-decimal base units.

use alloy_primitives::{
    utils::{format_ether, parse_ether},
    U256,
};
use thiserror::Error;

/// Decimal places of LOOM on both chains.
pub const COIN_DECIMALS: usize = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount {0:?}, expected a non-negative decimal number")]
    Invalid(String),

    #[error("amount {0:?} has more than 18 decimal places")]
    TooPrecise(String),

    #[error("amount {input:?} is out of range: {reason}")]
    OutOfRange { input: String, reason: String },
}

/// Parse a decimal string such as `"5"` or `"2.5"` into base units, exactly.
pub fn parse_coin_amount(input: &str) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(input.to_string()));
    }

    if fraction.len() > COIN_DECIMALS {
        return Err(AmountError::TooPrecise(input.to_string()));
    }

    let normalized = match (whole.is_empty(), fraction.is_empty()) {
        (true, _) => format!("0.{fraction}"),
        (false, true) => whole.to_string(),
        (false, false) => format!("{whole}.{fraction}"),
    };

    parse_ether(&normalized).map_err(|e| AmountError::OutOfRange {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Render base units as a decimal string without trailing zeros.
pub fn format_coin_amount(amount: U256) -> String {
    let formatted = format_ether(amount);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_whole_amount() {
        assert_eq!(
            parse_coin_amount("5").unwrap(),
            U256::from(5_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_fractional_amount() {
        assert_eq!(parse_coin_amount("2.5").unwrap(), U256::from(5 * ONE / 2));
        assert_eq!(parse_coin_amount(".5").unwrap(), U256::from(ONE / 2));
        assert_eq!(parse_coin_amount("1.").unwrap(), U256::from(ONE));
        assert_eq!(
            parse_coin_amount("0.000000000000000001").unwrap(),
            U256::from(1)
        );
    }

    #[test]
    fn test_parse_large_amount_is_exact() {
        let amount = parse_coin_amount("123456789012345678901234567890").unwrap();
        let expected = U256::from(123456789012345678901234567890u128) * U256::from(ONE);
        assert_eq!(amount, expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", ".", "-1", "1e18", "1.2.3", "abc", "0x10"] {
            assert_eq!(
                parse_coin_amount(input),
                Err(AmountError::Invalid(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_sub_wei() {
        assert!(matches!(
            parse_coin_amount("0.0000000000000000001"),
            Err(AmountError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(
            format_coin_amount(U256::from(2_500_000_000_000_000_000u64)),
            "2.5"
        );
        assert_eq!(format_coin_amount(U256::from(5 * ONE)), "5");
        assert_eq!(format_coin_amount(U256::ZERO), "0");
        assert_eq!(format_coin_amount(U256::from(1)), "0.000000000000000001");
    }
}
