//! Request body validation.
//!
//! Checks run in order and all failures are collected, so the client gets the
//! full list in one `{"errors": [...]}` response.

use crate::error::{ApiError, FieldError};

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on a missing value or one that is blank after trimming.
    pub fn not_empty(&mut self, param: &str, value: Option<&str>, msg: &str) -> &mut Self {
        let ok = value.map(|v| !v.trim().is_empty()).unwrap_or(false);
        self.check(ok, param, msg)
    }

    /// Fails only when the value is absent.
    pub fn exists(&mut self, param: &str, value: Option<&str>, msg: &str) -> &mut Self {
        self.check(value.is_some(), param, msg)
    }

    pub fn email(&mut self, param: &str, value: Option<&str>, msg: &str) -> &mut Self {
        let ok = value.map(is_email).unwrap_or(false);
        self.check(ok, param, msg)
    }

    /// Length is counted in characters, not bytes.
    pub fn min_len(&mut self, param: &str, value: Option<&str>, min: usize, msg: &str) -> &mut Self {
        let ok = value.map(|v| v.chars().count() >= min).unwrap_or(false);
        self.check(ok, param, msg)
    }

    pub fn check(&mut self, ok: bool, param: &str, msg: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::body_field(param, msg));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// Structural address check: `local@domain.tld`, no whitespace.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_email("jane@example.com"));
        assert!(is_email("jane.doe+feed@mail.example.co"));

        assert!(!is_email("jane"));
        assert!(!is_email("jane@"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("jane@example"));
        assert!(!is_email("jane@@example.com"));
        assert!(!is_email("jane doe@example.com"));
        assert!(!is_email("jane@exa_mple.com"));
        assert!(!is_email("jane@example..com"));
    }

    #[test]
    fn test_collects_all_failures_in_order() {
        let result = Validator::new()
            .not_empty("name", Some("   "), "Please enter your name")
            .email("email", Some("nope"), "Please enter a valid email id")
            .min_len("password", Some("12345"), 6, "Too short")
            .finish();

        match result {
            Err(ApiError::Validation(errors)) => {
                let params: Vec<_> = errors.iter().filter_map(|e| e.param.as_deref()).collect();
                assert_eq!(params, vec!["name", "email", "password"]);
                assert_eq!(errors[0].msg, "Please enter your name");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_exists_accepts_empty_string() {
        assert!(Validator::new().exists("password", Some(""), "x").finish().is_ok());
        assert!(Validator::new().exists("password", None, "x").finish().is_err());
    }

    #[test]
    fn test_min_len_counts_chars() {
        assert!(Validator::new()
            .min_len("password", Some("ééééé é"), 6, "x")
            .finish()
            .is_ok());
    }
}
