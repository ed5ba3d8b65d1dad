//! Numeric coercions for text and floating-point cells.

use crate::error::{Error, Result};

/// Parse an integer from cell text.
///
/// Accepts surrounding whitespace and integral decimal forms such as `"42.0"`.
pub fn parse_i64(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(f) => f64_to_i64(f),
        Err(_) => Err(Error::type_coercion(format!(
            "cannot convert '{}' to Int64",
            text
        ))),
    }
}

/// Parse a float from cell text.
pub fn parse_f64(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| Error::type_coercion(format!("cannot convert '{}' to Double", text)))
}

/// Convert a float to an integer only when no information is lost.
pub fn f64_to_i64(value: f64) -> Result<i64> {
    // i64::MAX is not exactly representable; 2^63 is the first float out of range
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && value.fract() == 0.0 && value >= -LIMIT && value < LIMIT {
        Ok(value as i64)
    } else {
        Err(Error::type_coercion(format!(
            "cannot convert {} to Int64 without loss",
            value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_i64() {
        assert_eq!(parse_i64("42").unwrap(), 42);
        assert_eq!(parse_i64(" -7 ").unwrap(), -7);
        assert_eq!(parse_i64("12.0").unwrap(), 12);
        assert!(parse_i64("12.5").is_err());
        assert!(parse_i64("abc").is_err());
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("123.45").unwrap(), 123.45);
        assert!(matches!(parse_f64("x"), Err(Error::TypeCoercion { .. })));
    }

    #[test]
    fn test_f64_to_i64_bounds() {
        assert_eq!(f64_to_i64(-3.0).unwrap(), -3);
        assert!(f64_to_i64(f64::NAN).is_err());
        assert!(f64_to_i64(9.3e18).is_err());
        assert!(f64_to_i64(0.5).is_err());
    }
}
