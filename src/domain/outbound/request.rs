use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

static E164_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Whether a phone number is in E.164 format
pub fn is_e164(number: &str) -> bool {
    E164_PATTERN.is_match(number)
}

fn validate_e164(number: &str) -> Result<(), ValidationError> {
    if is_e164(number) {
        Ok(())
    } else {
        Err(ValidationError::new("e164"))
    }
}

fn validate_e164_list(numbers: &[String]) -> Result<(), ValidationError> {
    numbers.iter().try_for_each(|n| validate_e164(n))
}

/// Single outbound SMS; bodies up to 1600 characters (ten concatenated segments)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(custom(function = "validate_e164"))]
    pub to: String,
    #[validate(length(min = 1, max = 1600))]
    pub body: String,
}

/// Outbound voice call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PlaceCallRequest {
    #[validate(custom(function = "validate_e164"))]
    pub to: String,
    #[serde(default)]
    #[validate(custom(function = "validate_e164"))]
    pub from: Option<String>,
}

/// Same SMS to many recipients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BulkMessageRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_e164_list"))]
    pub to: Vec<String>,
    #[validate(length(min = 1, max = 1600))]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_e164() {
        assert!(is_e164("+15551234567"));
        assert!(is_e164("+442071838750"));
        assert!(!is_e164("5551234567"));
        assert!(!is_e164("+05551234567"));
        assert!(!is_e164("+1555123456789012"));
    }

    #[test]
    fn test_send_message_validation() {
        let valid = SendMessageRequest {
            to: "+15551234567".to_string(),
            body: "Your technician is on the way".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_number = SendMessageRequest {
            to: "555-1234".to_string(),
            ..valid.clone()
        };
        assert!(bad_number.validate().is_err());

        let empty_body = SendMessageRequest {
            body: String::new(),
            ..valid.clone()
        };
        assert!(empty_body.validate().is_err());

        let long_body = SendMessageRequest {
            body: "x".repeat(1601),
            ..valid
        };
        assert!(long_body.validate().is_err());
    }

    #[test]
    fn test_place_call_optional_from() {
        let without_from = PlaceCallRequest {
            to: "+15551234567".to_string(),
            from: None,
        };
        assert!(without_from.validate().is_ok());

        let bad_from = PlaceCallRequest {
            to: "+15551234567".to_string(),
            from: Some("anonymous".to_string()),
        };
        assert!(bad_from.validate().is_err());
    }

    #[test]
    fn test_bulk_validation() {
        let valid = BulkMessageRequest {
            to: vec!["+15551234567".to_string(), "+15557654321".to_string()],
            body: "Reminder: appointment tomorrow".to_string(),
        };
        assert!(valid.validate().is_ok());

        let one_bad = BulkMessageRequest {
            to: vec!["+15551234567".to_string(), "nope".to_string()],
            ..valid.clone()
        };
        assert!(one_bad.validate().is_err());

        let too_many = BulkMessageRequest {
            to: vec!["+15551234567".to_string(); 101],
            ..valid.clone()
        };
        assert!(too_many.validate().is_err());

        let none = BulkMessageRequest { to: vec![], ..valid };
        assert!(none.validate().is_err());
    }
}
