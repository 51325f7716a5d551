use super::*;

#[test]
fn test_sign_in_requires_email_and_password() {
    assert_eq!(
        validate_sign_in("", "secret"),
        Err(ValidationError::EmailRequired)
    );
    assert_eq!(
        validate_sign_in("student@example.com", ""),
        Err(ValidationError::PasswordRequired)
    );
    assert!(validate_sign_in("student@example.com", "x").is_ok());
}

#[test]
fn test_email_format() {
    for bad in ["student", "student@", "@example.com", "student@example", "a b@c.d"] {
        assert_eq!(
            validate_sign_in(bad, "secret"),
            Err(ValidationError::InvalidEmail),
            "{} should be rejected",
            bad
        );
    }
    assert!(validate_sign_in("  first.last+tag@uni.edu  ", "secret").is_ok());
}

#[test]
fn test_sign_up_password_mismatch() {
    let err = validate_sign_up("s@example.com", "secret1", "secret2").unwrap_err();
    assert_eq!(err, ValidationError::PasswordMismatch);
    assert_eq!(err.to_string(), "Passwords do not match");
}

#[test]
fn test_sign_up_password_length() {
    assert_eq!(
        validate_sign_up("s@example.com", "abc", "abc"),
        Err(ValidationError::PasswordTooShort)
    );
    assert!(validate_sign_up("s@example.com", "abcdef", "abcdef").is_ok());
}
