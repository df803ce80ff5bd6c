//! Client-side input validation
//!
//! Validation happens before any network call so malformed input never costs
//! a round trip. Phone numbers follow the E.164-like rule the backend
//! enforces: optional leading `+`, first digit 1-9, 2 to 15 digits total.

/// Strip everything except digits and a single leading `+`.
pub fn normalize_phone(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '+' && out.is_empty() {
            out.push('+');
        }
    }
    out
}

/// Validate a normalized phone number against `^\+?[1-9]\d{1,14}$` semantics.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 2 || digits.len() > 15 {
        return false;
    }
    let mut chars = digits.chars();
    match chars.next() {
        Some(c) if ('1'..='9').contains(&c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_digit())
}

/// OTP codes are exactly six ASCII digits.
pub fn is_valid_otp(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
}

/// Keep only digits, truncated to the OTP length. Used for live input.
pub fn sanitize_otp_input(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(6).collect()
}
