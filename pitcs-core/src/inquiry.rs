//! The contact-form submission relayed by email.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::CoreError;

/// A contact-form submission.
///
/// Every field is an opaque string. Absent fields and JSON `null` become the
/// empty string; numbers and booleans are kept in their textual form.
/// Only a JSON object deserializes into an inquiry; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub contact: String,
    /// Category label picked by the inquirer, e.g. `"Sales"`.
    pub option: String,
    pub message: String,
    /// Client-supplied submission time. Never parsed.
    pub timestamp: String,
}

impl Inquiry {
    /// Check that the fields needed to answer the inquirer are present.
    ///
    /// `name`, `email` and `message` must be non-blank and `email` must have
    /// the shape `local@domain` without whitespace.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidInquiry`] naming the first failing field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [("name", &self.name), ("email", &self.email), ("message", &self.message)];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidInquiry {
                    field: field.to_owned(),
                    reason: "is required".to_owned(),
                });
            }
        }
        if !looks_like_address(self.email.trim()) {
            return Err(CoreError::InvalidInquiry {
                field: "email".to_owned(),
                reason: format!("'{}' is not an email address", self.email),
            });
        }
        Ok(())
    }
}

fn looks_like_address(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

impl<'de> Deserialize<'de> for Inquiry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(InquiryVisitor)
    }
}

struct InquiryVisitor;

impl<'de> Visitor<'de> for InquiryVisitor {
    type Value = Inquiry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an inquiry object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Inquiry, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut inquiry = Inquiry::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = match key.as_str() {
                "name" => &mut inquiry.name,
                "email" => &mut inquiry.email,
                "contact" => &mut inquiry.contact,
                "option" => &mut inquiry.option,
                "message" => &mut inquiry.message,
                "timestamp" => &mut inquiry.timestamp,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            *slot = map.next_value::<OpaqueString>()?.0;
        }
        Ok(inquiry)
    }
}

/// A scalar JSON value kept as text.
struct OpaqueString(String);

impl<'de> Deserialize<'de> for OpaqueString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OpaqueStringVisitor).map(OpaqueString)
    }
}

struct OpaqueStringVisitor;

impl Visitor<'_> for OpaqueStringVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}
