//! Input validation for the raw key/value fields callers submit.

use crate::error::{FieldError, ValidationError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Untyped form fields as they arrive from a caller.
pub type RawFields = Map<String, Value>;

pub const MESSAGE_FIELD: &str = "message";
pub const USER_ID_FIELD: &str = "userId";

/// Text with at least one non-whitespace character, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, FieldError> {
        if raw.trim().is_empty() {
            return Err(FieldError::new(field, "must not be empty"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate a user id that arrived outside a form (path segment, CLI flag).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::from_field(USER_ID_FIELD, raw).map_err(|e| ValidationError { fields: vec![e] })
    }

    fn from_field(field: &'static str, raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new(field, "must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub message: NonEmptyText,
    pub user_id: UserId,
}

/// Read a required string field, recording why it was rejected.
pub(crate) fn required_str<'a>(
    fields: &'a RawFields,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match fields.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.push(FieldError::new(field, "must be a string"));
            None
        }
    }
}

/// Read an optional string field; null and absent are both `None`.
pub(crate) fn optional_str<'a>(
    fields: &'a RawFields,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match fields.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.push(FieldError::new(field, "must be a string"));
            None
        }
    }
}

pub(crate) fn collect_user_id(fields: &RawFields, errors: &mut Vec<FieldError>) -> Option<UserId> {
    let raw = required_str(fields, USER_ID_FIELD, errors)?;
    UserId::from_field(USER_ID_FIELD, raw)
        .map_err(|e| errors.push(e))
        .ok()
}

/// Validate a send-message form. Every offending field is reported.
pub fn validate_send_message(fields: &RawFields) -> Result<SendMessageRequest, ValidationError> {
    let mut errors = Vec::new();

    let message = required_str(fields, MESSAGE_FIELD, &mut errors).and_then(|raw| {
        NonEmptyText::parse(MESSAGE_FIELD, raw)
            .map_err(|e| errors.push(e))
            .ok()
    });
    let user_id = collect_user_id(fields, &mut errors);

    match (message, user_id) {
        (Some(message), Some(user_id)) if errors.is_empty() => {
            Ok(SendMessageRequest { message, user_id })
        }
        _ => Err(ValidationError { fields: errors }),
    }
}

/// Validate a form that carries only a user id (history erase).
pub fn validate_user_id(fields: &RawFields) -> Result<UserId, ValidationError> {
    let mut errors = Vec::new();
    collect_user_id(fields, &mut errors).ok_or(ValidationError { fields: errors })
}
