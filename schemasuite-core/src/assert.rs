//! The assertion primitive through which pass/fail reaches the host.

use serde_json::Value;

/// A failed assertion.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AssertionError {
    /// Description of the failure.
    pub message: String,
    /// The observed value, for equality assertions.
    pub actual: Option<Value>,
    /// The expected value, for equality assertions.
    pub expected: Option<Value>,
}

/// Boolean-check and equality-check primitives.
pub trait Assert: Send + Sync {
    /// Fails unless `condition` holds.
    fn ok(&self, condition: bool, message: &str) -> Result<(), AssertionError>;

    /// Fails unless `actual` equals `expected`.
    fn equal(&self, actual: &Value, expected: &Value) -> Result<(), AssertionError>;
}

/// Default assertions: a plain boolean check and strict JSON equality.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrictAssert;

impl Assert for StrictAssert {
    fn ok(&self, condition: bool, message: &str) -> Result<(), AssertionError> {
        if condition {
            Ok(())
        } else {
            Err(AssertionError {
                message: message.to_owned(),
                actual: None,
                expected: None,
            })
        }
    }

    fn equal(&self, actual: &Value, expected: &Value) -> Result<(), AssertionError> {
        if actual == expected {
            Ok(())
        } else {
            Err(AssertionError {
                message: format!("expected {expected}, got {actual}"),
                actual: Some(actual.clone()),
                expected: Some(expected.clone()),
            })
        }
    }
}
