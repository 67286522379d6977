//! Field validation helpers shared by intake endpoints: Chilean RUT
//! checksum/normalization and email format.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Check an email address against a basic structural pattern.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Strip dots and whitespace from a RUT and uppercase the check digit.
/// Returns `body-dv` form, e.g. `12.345.678-5` -> `12345678-5`.
pub fn normalize_rut(rut: &str) -> String {
    let cleaned: String = rut
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase();
    if cleaned.len() < 2 {
        return cleaned;
    }
    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    format!("{}-{}", body, dv)
}

/// Validate a Chilean RUT: weighted digit sum mod 11 with the standard
/// cyclic 2..7 multiplier over the body read right-to-left, mapped to a
/// check digit of 0-9 or 'K'.
pub fn validate_rut(rut: &str) -> bool {
    let normalized = normalize_rut(rut);
    let Some((body, dv)) = normalized.rsplit_once('-') else {
        return false;
    };
    if body.is_empty() || body.len() > 9 || !body.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let mut sum: u32 = 0;
    let mut factor = 2;
    for c in body.chars().rev() {
        sum += c.to_digit(10).unwrap() * factor;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }

    let expected = match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        n => char::from_digit(n, 10).unwrap(),
    };

    dv.chars().next() == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_valid_rut() {
        assert!(validate_rut("12345678-5"));
        assert!(validate_rut("12.345.678-5"));
        assert!(validate_rut("7775777-5"));
    }

    #[test]
    fn accepts_k_check_digit() {
        // 20.347.878 has a K check digit
        assert!(validate_rut("20347878-K"));
        assert!(validate_rut("20347878-k"));
    }

    #[test]
    fn rejects_corrupted_check_digit() {
        assert!(!validate_rut("12345678-6"));
        assert!(!validate_rut("12345678-K"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(!validate_rut(""));
        assert!(!validate_rut("-5"));
        assert!(!validate_rut("abc-1"));
        assert!(!validate_rut("12345678"));
    }

    #[test]
    fn normalizes_formatting() {
        assert_eq!(normalize_rut("12.345.678-5"), "12345678-5");
        assert_eq!(normalize_rut("20347878k"), "20347878-K");
    }

    #[test]
    fn email_format() {
        assert!(validate_email("tech@liftops.cl"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("missing@tld"));
    }
}
