//! Self-validation rules for [`Client`].
//!
//! Every rule is evaluated independently so callers receive the full set of
//! violated fields, not just the first one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::types::Client;

pub const NAME_MIN_LEN: usize = 1;
pub const NAME_MAX_LEN: usize = 55;
pub const PHONE_MIN_LEN: usize = 10;
pub const PHONE_MAX_LEN: usize = 15;

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, replacing any previous one.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// True when the domain part has at least two labels and ends in an
/// alphabetic top-level domain of two or more letters.
fn has_dotted_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

impl Client {
    /// Validates the current field values.
    ///
    /// Identifier and timestamp validity are guaranteed by their types, so
    /// only the business fields can fail.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let name_len = self.name.trim().chars().count();
        if name_len < NAME_MIN_LEN {
            errors.add("name", "Name is required");
        } else if name_len > NAME_MAX_LEN {
            errors.add("name", "Name must have at most 55 characters");
        }

        let email = self.email.trim();
        if !email.validate_email() || !has_dotted_domain(email) {
            errors.add("email", "Invalid email");
        }

        let phone_len = self.phone.trim().chars().count();
        if phone_len < PHONE_MIN_LEN {
            errors.add("phone", "Phone must have at least 10 digits");
        } else if phone_len > PHONE_MAX_LEN {
            errors.add("phone", "Phone must have at most 15 digits");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
