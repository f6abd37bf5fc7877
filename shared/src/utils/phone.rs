//! Phone number helpers safe to use in log output

/// Mask a phone number for logs, keeping the country prefix and last four digits
/// (e.g. `+15155551234` becomes `+1******1234`).
pub fn mask_phone_number(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 {
        return "****".to_string();
    }

    let prefix = if phone.starts_with("+1") { "+1" } else { "" };
    let skip = if prefix.is_empty() { 0 } else { 1 };
    let tail: String = digits[digits.len() - 4..].iter().collect();
    let hidden = digits.len() - 4 - skip;

    format!("{}{}{}", prefix, "*".repeat(hidden), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_e164_us_number() {
        assert_eq!(mask_phone_number("+15155551234"), "+1******1234");
    }

    #[test]
    fn test_mask_bare_digits() {
        assert_eq!(mask_phone_number("5155551234"), "******1234");
    }

    #[test]
    fn test_mask_short_input() {
        assert_eq!(mask_phone_number("12345"), "****");
        assert_eq!(mask_phone_number(""), "****");
    }
}
