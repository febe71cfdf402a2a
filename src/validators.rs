/// Registration input checks
///
/// Emails are the account key, so they are checked for shape and length only.
/// Display names must be non-empty, bounded, and free of control characters.
/// Storage always binds parameters, so no content screening happens here.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_EMAIL_LENGTH: usize = 5;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64; // RFC 5321
const MAX_NAME_LENGTH: usize = 256;

lazy_static! {
    // Simplified RFC 5322 addr-spec: dot-atom local part, hostname domain
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Check an email address and return it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    let field = || "email".to_string();

    if email.is_empty() {
        return Err(ValidationError::EmptyField(field()));
    }
    if email.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort(field(), MIN_EMAIL_LENGTH));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong(field(), MAX_EMAIL_LENGTH));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidFormat(field()));
    }

    match email.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LENGTH => Ok(email.to_string()),
        Some(_) => Err(ValidationError::TooLong(field(), MAX_LOCAL_PART_LENGTH)),
        None => Err(ValidationError::InvalidFormat(field())),
    }
}

/// Check a display name and return it trimmed
///
/// `field` names the input in the error ("first_name", "last_name").
pub fn is_valid_name(field: &str, name: &str) -> Result<String, ValidationError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong(field.to_string(), MAX_NAME_LENGTH));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(name.to_string())
}
