//! Result records and the hooks they are handed to.

use std::sync::Arc;

use serde_json::Value;

use crate::suite::Expectation;
use crate::trace_categories;
use crate::validator::{ErrorDetails, Validator};

/// The finalized record of one validator run against one test case.
#[derive(Clone, Debug)]
pub struct TestResult {
    /// Whether the validator met the expectation.
    pub passed: bool,
    /// The validator that ran.
    pub validator: Arc<dyn Validator>,
    /// The schema validated against.
    pub schema: Arc<Value>,
    /// The validated data.
    pub data: Arc<Value>,
    /// Actual validity; `None` in exception mode or for non-boolean verdicts.
    pub valid: Option<bool>,
    /// The test case's expectation.
    pub expectation: Expectation,
    /// Validation error details, when known.
    pub errors: Option<ErrorDetails>,
}

impl TestResult {
    /// The expected validity, in validity mode.
    pub const fn expected_valid(&self) -> Option<bool> {
        self.expectation.valid()
    }

    /// The expected error message, in exception mode.
    pub fn expected_error(&self) -> Option<&str> {
        self.expectation.error()
    }
}

/// A callback receiving finalized results. Return values are not consulted and
/// panics are not caught.
pub type ResultHook = Arc<dyn Fn(&TestResult) + Send + Sync>;

/// The optional result hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Called once for every finalized result.
    pub after_each: Option<ResultHook>,
    /// Called once for every finalized result that did not pass, after `after_each`.
    pub after_error: Option<ResultHook>,
}

impl Hooks {
    /// Fires the hooks applicable to `result`.
    pub fn dispatch(&self, result: &TestResult) {
        if let Some(after_each) = &self.after_each {
            tracing::trace!(target: trace_categories::HOOKS, passed = result.passed, "after_each");
            after_each(result);
        }

        if !result.passed {
            if let Some(after_error) = &self.after_error {
                tracing::trace!(target: trace_categories::HOOKS, "after_error");
                after_error(result);
            }
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("after_each", &self.after_each.is_some())
            .field("after_error", &self.after_error.is_some())
            .finish()
    }
}
