//! Field rules for user input.
//!
//! Validation is pure: anything that needs the database (email uniqueness)
//! is looked up by the caller and passed in as a fact. Each field reports the
//! first rule it fails, and fields are reported in rule order.

use lazy_static::lazy_static;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::dto::{CreateUser, UpdateUser, UserPayload};

pub const PASSWORD_MIN_CHARS: usize = 6;

/// Field-level errors in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.fields.push((field, vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.fields.iter().map(|(_, m)| m.len()).sum()
    }

    #[cfg(test)]
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, messages)| messages.as_slice())
    }

    #[cfg(test)]
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// First message, plus a count of the rest.
    pub fn summary(&self) -> String {
        let Some(first) = self.fields.iter().flat_map(|(_, m)| m.iter()).next() else {
            return "The given data was invalid.".to_string();
        };
        match self.len() - 1 {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// The email the uniqueness check should look up, if it is syntactically valid.
pub fn checked_email(payload: &UserPayload) -> Option<String> {
    match payload.email.as_ref()? {
        Value::String(s) => {
            let email = s.trim();
            is_valid_email(email).then(|| email.to_string())
        }
        _ => None,
    }
}

/// Rules for create: name required, email required+valid+unique, password required+min.
pub fn validate_create(
    payload: &UserPayload,
    email_taken: bool,
) -> Result<CreateUser, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required_string(&mut errors, "name", payload.name.as_ref(), true);
    let email = email_field(&mut errors, payload.email.as_ref(), email_taken);
    let password = required_string(&mut errors, "password", payload.password.as_ref(), false)
        .filter(|p| min_chars(&mut errors, "password", p));

    errors.into_result(|| CreateUser {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        password: password.unwrap_or_default(),
    })
}

/// Rules for update: like create, but password may be left out. A password
/// key that is present must be a non-empty string; `null` and `""` are not.
pub fn validate_update(
    payload: &UserPayload,
    email_taken: bool,
) -> Result<UpdateUser, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required_string(&mut errors, "name", payload.name.as_ref(), true);
    let email = email_field(&mut errors, payload.email.as_ref(), email_taken);
    let password = match payload.password.as_ref() {
        None => None,
        Some(Value::String(p)) if !p.is_empty() => {
            min_chars(&mut errors, "password", p);
            Some(p.clone())
        }
        Some(_) => {
            errors.add("password", must_be_string("password"));
            None
        }
    };

    errors.into_result(|| UpdateUser {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        password,
    })
}

fn required_string(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&Value>,
    trim: bool,
) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
        Some(Value::String(s)) => {
            let s = if trim { s.trim() } else { s.as_str() };
            if s.is_empty() {
                errors.add(field, format!("The {field} field is required."));
                None
            } else {
                Some(s.to_string())
            }
        }
        Some(_) => {
            errors.add(field, must_be_string(field));
            None
        }
    }
}

fn email_field(
    errors: &mut ValidationErrors,
    value: Option<&Value>,
    email_taken: bool,
) -> Option<String> {
    let email = required_string(errors, "email", value, true)?;
    if !is_valid_email(&email) {
        errors.add("email", "The email field must be a valid email address.");
        return None;
    }
    if email_taken {
        errors.add("email", taken("email"));
        return None;
    }
    Some(email)
}

fn min_chars(errors: &mut ValidationErrors, field: &'static str, value: &str) -> bool {
    if value.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            field,
            format!("The {field} field must be at least {PASSWORD_MIN_CHARS} characters."),
        );
        false
    } else {
        true
    }
}

fn must_be_string(field: &str) -> String {
    format!("The {field} field must be a string.")
}

pub fn taken(field: &str) -> String {
    format!("The {field} has already been taken.")
}
