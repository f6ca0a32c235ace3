use crate::error::DeliveryError;

/// Normalize a US phone number to `+1XXXXXXXXXX`.
///
/// Non-digits are dropped first. Ten digits must not start with `1`; eleven
/// digits must.
pub fn normalize_phone_number(raw: &str) -> Result<String, DeliveryError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 if !digits.starts_with('1') => Ok(format!("+1{digits}")),
        11 if digits.starts_with('1') => Ok(format!("+{digits}")),
        _ => Err(DeliveryError::InvalidPhoneNumber(raw.to_string())),
    }
}
