//! Resource quantity codec
//!
//! Declarative and transport models carry quantities as plain strings; the
//! platform wraps them in [`Quantity`]. Strings are validated and passed
//! through verbatim so a value like `1.5Gi` round-trips without being
//! canonicalized into `1536Mi`. [`parse_bytes`] checks that a quantity is a
//! byte count that fits in a `u64`.

use crate::error::{ConvertError, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 1),
    ("Mi", 2),
    ("Gi", 3),
    ("Ti", 4),
    ("Pi", 5),
    ("Ei", 6),
];

const DECIMAL_SUFFIXES: [(&str, i32); 10] = [
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
    ("", 0),
];

/// A quantity split into an integer mantissa and its scaling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedQuantity {
    /// Digits of the number with the decimal point removed
    mantissa: i128,
    /// Number of digits that followed the decimal point
    fraction_digits: u32,
    multiplier: Multiplier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Multiplier {
    /// 1024^n
    Binary(u32),
    /// 10^n
    Decimal(i32),
}

impl ParsedQuantity {
    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Value in bytes, rounded up; `None` if negative or too large for `u64`
    pub fn to_bytes(&self) -> Option<u64> {
        if self.is_negative() {
            return None;
        }
        let mut numerator = self.mantissa;
        let mut denominator: i128 = 10i128.checked_pow(self.fraction_digits)?;
        match self.multiplier {
            Multiplier::Binary(power) => {
                numerator = numerator.checked_mul(1024i128.checked_pow(power)?)?;
            }
            Multiplier::Decimal(exp) if exp >= 0 => {
                numerator = numerator.checked_mul(10i128.checked_pow(exp.unsigned_abs())?)?;
            }
            Multiplier::Decimal(exp) => {
                denominator = denominator.checked_mul(10i128.checked_pow(exp.unsigned_abs())?)?;
            }
        }
        let bytes = numerator.checked_add(denominator - 1)? / denominator;
        u64::try_from(bytes).ok()
    }
}

/// Parse a Kubernetes quantity string such as `2Gi`, `500m`, `1.5` or `1e3`
pub fn parse_quantity(field: &str, value: &str) -> Result<ParsedQuantity> {
    let invalid = || ConvertError::InvalidQuantity {
        field: field.to_string(),
        value: value.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed != value {
        return Err(invalid());
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let number_end = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_end);

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.contains('.') {
        return Err(invalid());
    }

    let digits = format!("{whole}{fraction}");
    let magnitude: i128 = digits.parse().map_err(|_| invalid())?;
    let mantissa = if negative { -magnitude } else { magnitude };
    let fraction_digits = u32::try_from(fraction.len()).map_err(|_| invalid())?;

    let multiplier = parse_suffix(suffix).ok_or_else(invalid)?;

    Ok(ParsedQuantity {
        mantissa,
        fraction_digits,
        multiplier,
    })
}

fn parse_suffix(suffix: &str) -> Option<Multiplier> {
    if let Some((_, power)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some(Multiplier::Binary(*power));
    }
    if let Some((_, exp)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some(Multiplier::Decimal(*exp));
    }
    // Decimal exponent form: e3, E-2
    let rest = suffix.strip_prefix('e').or_else(|| suffix.strip_prefix('E'))?;
    rest.parse::<i32>().ok().map(Multiplier::Decimal)
}

/// Parse a quantity that must be a non-negative byte count, rounding up
pub fn parse_bytes(field: &str, value: &str) -> Result<u64> {
    parse_quantity(field, value)?
        .to_bytes()
        .ok_or_else(|| ConvertError::InvalidQuantity {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Validate a quantity string and wrap it for the platform model
pub fn to_quantity(field: &str, value: &str) -> Result<Quantity> {
    parse_quantity(field, value)?;
    Ok(Quantity(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary_suffix_to_bytes() {
        let q = parse_quantity("memory", "2Gi").unwrap();
        assert_eq!(q.to_bytes(), Some(2 * 1024 * 1024 * 1024));
    }

    #[test]
    fn test_parse_fraction_rounds_up() {
        let q = parse_quantity("memory", "1.5Ki").unwrap();
        assert_eq!(q.to_bytes(), Some(1536));
        let q = parse_quantity("cpu", "500m").unwrap();
        assert_eq!(q.to_bytes(), Some(1));
    }

    #[test]
    fn test_parse_exponent() {
        let q = parse_quantity("storage", "1e3").unwrap();
        assert_eq!(q.to_bytes(), Some(1000));
    }

    #[test]
    fn test_negative_has_no_byte_value() {
        let q = parse_quantity("memory", "-1Gi").unwrap();
        assert!(q.is_negative());
        assert_eq!(q.to_bytes(), None);
    }

    #[test]
    fn test_fraction_at_mantissa_limit_does_not_overflow() {
        // mantissa is i128::MAX, rounding up must not wrap
        let q = parse_quantity("memory", "1701411834604692317316873037158841057.27").unwrap();
        assert_eq!(q.to_bytes(), None);
    }

    #[test]
    fn test_parse_bytes() {
        assert_eq!(parse_bytes("guest", "1Gi").unwrap(), 1024 * 1024 * 1024);
        assert!(matches!(
            parse_bytes("guest", "-1Gi"),
            Err(ConvertError::InvalidQuantity { .. })
        ));
        assert!(parse_bytes("guest", "100Ei").is_err());
        assert!(parse_bytes("guest", "1701411834604692317316873037158841057.27").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "Gi", "1.2.3", "12XB", " 1Gi", "1 Gi", "."] {
            assert!(parse_quantity("memory", bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn test_to_quantity_passes_string_through() {
        assert_eq!(to_quantity("memory", "1.5Gi").unwrap().0, "1.5Gi");
    }
}
