//! Field-level validation errors shared by the model and the HTTP layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TITLE_MIN_CHARS: usize = 1;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Machine-readable reason attached to a [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    StringTooShort,
    StringTooLong,
    NullNotAllowed,
    JsonInvalid,
    TypeError,
    IntParsing,
    LessThanEqual,
    GreaterThanEqual,
}

/// One offending value: where it was, what was wrong, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the value, e.g. `["body", "title"]`.
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn new<L, S>(loc: L, msg: impl Into<String>, kind: ErrorKind) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
            kind,
        }
    }

    /// Error located on a field of the request body.
    pub fn body(field: &str, msg: impl Into<String>, kind: ErrorKind) -> Self {
        Self::new(["body", field], msg, kind)
    }
}

/// Input rejected before it reached storage. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation error(s): {}", .errors.len(), summary(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// True if any error points at `field` in the request body.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|error| error.loc.last().is_some_and(|last| last == field))
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.loc.join("."), error.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates field errors so every bad field is reported at once.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    pub(crate) fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Length is counted in characters, not bytes.
pub(crate) fn check_title(title: &str) -> Option<FieldError> {
    let chars = title.chars().count();
    if chars < TITLE_MIN_CHARS {
        Some(FieldError::body(
            "title",
            format!("String should have at least {TITLE_MIN_CHARS} character"),
            ErrorKind::StringTooShort,
        ))
    } else if chars > TITLE_MAX_CHARS {
        Some(FieldError::body(
            "title",
            format!("String should have at most {TITLE_MAX_CHARS} characters"),
            ErrorKind::StringTooLong,
        ))
    } else {
        None
    }
}

pub(crate) fn check_description(description: &str) -> Option<FieldError> {
    (description.chars().count() > DESCRIPTION_MAX_CHARS).then(|| {
        FieldError::body(
            "description",
            format!("String should have at most {DESCRIPTION_MAX_CHARS} characters"),
            ErrorKind::StringTooLong,
        )
    })
}
