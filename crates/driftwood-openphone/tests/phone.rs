use driftwood_openphone::{DeliveryError, normalize_phone_number};

#[test]
fn ten_digit_numbers_gain_country_code() {
    assert_eq!(normalize_phone_number("5551234567").unwrap(), "+15551234567");
}

#[test]
fn eleven_digit_numbers_keep_leading_one() {
    assert_eq!(normalize_phone_number("15551234567").unwrap(), "+15551234567");
}

#[test]
fn ten_digits_starting_with_one_are_rejected() {
    let err = normalize_phone_number("1555123456").unwrap_err();
    assert!(matches!(err, DeliveryError::InvalidPhoneNumber(raw) if raw == "1555123456"));
}

#[test]
fn short_and_long_numbers_are_rejected() {
    for raw in ["", "555-1234", "+44 20 7946 0958 12"] {
        assert!(normalize_phone_number(raw).is_err(), "{raw} should be invalid");
    }
}
