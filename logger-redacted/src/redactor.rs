use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email pattern");
    // Ten-digit subscriber numbers, grouped 5-5 or 3-3-4, with an optional country code
    static ref PHONE_REGEX: Regex = Regex::new(
        r"(?:\+\d{1,3}[\s-]?)?\b(?:\d{5}[\s-]?\d{5}|\d{3}[\s.-]\d{3}[\s.-]\d{4})\b"
    )
    .expect("valid phone pattern");
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    /// Replace matches with a short stable hash instead of a mask, so two
    /// log lines about the same subscriber can still be correlated
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            hash_for_correlation: true,
        }
    }
}

/// PII redactor for log fields and messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        if self.config.redact_phones {
            result = self.redact_phones(&result);
        }

        result
    }

    /// Mask a phone number for display, keeping the last four digits.
    pub fn mask_phone(phone: &str) -> String {
        let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.len() <= 4 {
            return "*".repeat(digits.len());
        }
        let visible: String = digits[digits.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(digits.len() - 4), visible)
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let email = &caps[0];
                if self.config.hash_for_correlation {
                    format!("EMAIL[{}]", Self::hash_value(email))
                } else {
                    match email.split_once('@') {
                        Some((local, domain)) => format!(
                            "{}***@{}***",
                            local.chars().next().unwrap_or('*'),
                            domain.chars().next().unwrap_or('*')
                        ),
                        None => "***@***".to_string(),
                    }
                }
            })
            .to_string()
    }

    fn redact_phones(&self, text: &str) -> String {
        PHONE_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let phone = &caps[0];
                if self.config.hash_for_correlation {
                    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
                    format!("PHONE[{}]", Self::hash_value(&digits))
                } else {
                    Self::mask_phone(phone)
                }
            })
            .to_string()
    }

    fn hash_value(value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD_NO_PAD.encode(&result[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_phone_masked_to_last_four() {
        let redacted = masking().redact("Customer 9876543210 called");
        assert_eq!(redacted, "Customer ******3210 called");
    }

    #[test]
    fn test_country_code_and_grouping() {
        let redacted = masking().redact("reach at +91 98765 43210 today");
        assert_eq!(redacted, "reach at ********3210 today");
    }

    #[test]
    fn test_amounts_and_ids_untouched() {
        let text = "paid 1000.00 against invoice 550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(masking().redact(text), text);
    }

    #[test]
    fn test_email_masked() {
        let redacted = masking().redact("billing contact ravi.k@example.net");
        assert_eq!(redacted, "billing contact r***@e***");
    }

    #[test]
    fn test_hash_is_stable_across_formatting() {
        let redactor = PiiRedactor::default();
        let a = redactor.redact("9876543210");
        let b = redactor.redact("98765-43210");
        assert!(a.starts_with("PHONE["));
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_numbers_fully_masked() {
        assert_eq!(PiiRedactor::mask_phone("123"), "***");
    }
}
