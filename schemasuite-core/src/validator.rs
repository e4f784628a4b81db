//! The validator capability driven by the engine.
//!
//! Validators are supplied by the caller; the engine never constructs one. A
//! validator answers each `(schema, data)` pair either immediately or through a
//! deferred computation, and the shape of that answer selects the execution
//! protocol (see [`crate::execution`]).

use std::borrow::Cow;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

/// Validation error details, one JSON object per reported problem.
pub type ErrorDetails = Vec<Value>;

/// The raw value a validator produced for a single validation.
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// A validity flag.
    Flag(bool),
    /// A value handed back by the validator. Validators that reflect the input
    /// data on success return the very `Arc` they were given.
    Data(Arc<Value>),
}

impl Verdict {
    /// Returns the validity flag, or `None` if this verdict is not a boolean.
    pub const fn validity(&self) -> Option<bool> {
        match self {
            Self::Flag(valid) => Some(*valid),
            Self::Data(_) => None,
        }
    }

    /// Returns whether this verdict is strictly equal to `data`: primitives
    /// compare by value, objects and arrays by identity.
    pub fn is_strictly(&self, data: &Arc<Value>) -> bool {
        match self {
            Self::Flag(valid) => data.as_bool() == Some(*valid),
            Self::Data(value) => {
                if Arc::ptr_eq(value, data) {
                    true
                } else if value.is_object() || value.is_array() {
                    false
                } else {
                    value == data
                }
            }
        }
    }

    /// Renders this verdict as a JSON value, for assertions and diagnostics.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Flag(valid) => Value::Bool(*valid),
            Self::Data(value) => value.as_ref().clone(),
        }
    }
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        Self::Flag(valid)
    }
}

/// A deferred validation failure.
///
/// A rejection carrying `errors` is an ordinary invalid result; one without is
/// treated as an exception and compared by its message text.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Rejection {
    /// Message text of the failure.
    pub message: String,
    /// Validation error details, when the failure is a validation result.
    pub errors: Option<ErrorDetails>,
}

impl Rejection {
    /// Creates a rejection representing an exception with the given message.
    pub fn exception(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a rejection representing an invalid validation result.
    pub fn invalid(message: impl Into<String>, errors: ErrorDetails) -> Self {
        Self {
            message: message.into(),
            errors: Some(errors),
        }
    }
}

/// A deferred verdict.
pub type DeferredVerdict = BoxFuture<'static, Result<Verdict, Rejection>>;

/// What a validator returns from [`Validator::validate`].
pub enum Validation {
    /// The verdict is available now.
    Immediate(Verdict),
    /// The verdict is produced later, and may be rejected.
    Deferred(DeferredVerdict),
}

impl Validation {
    /// Returns whether this validation is deferred.
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl std::fmt::Debug for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(verdict) => f.debug_tuple("Immediate").field(verdict).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<bool> for Validation {
    fn from(valid: bool) -> Self {
        Self::Immediate(Verdict::Flag(valid))
    }
}

/// A schema validator under test.
pub trait Validator: Send + Sync {
    /// Returns a display name for this validator.
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("validator")
    }

    /// Validates `data` against `schema`.
    fn validate(&self, schema: &Value, data: &Arc<Value>) -> Validation;

    /// Returns the error details of the most recent immediate validation, if any.
    fn errors(&self) -> Option<ErrorDetails> {
        None
    }
}

impl std::fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
