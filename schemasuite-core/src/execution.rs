//! Execution of test cases against validators.
//!
//! # Protocols
//!
//! How a validator's answer is interpreted depends on its shape and on whether
//! asynchronous mode is enabled:
//!
//! 1. **Synchronous**: an [`Validation::Immediate`] verdict (in either mode) is the
//!    validity flag; error details are read from [`Validator::errors`] right after
//!    the call.
//! 2. **Asynchronous success**: in asynchronous mode, a fulfilled
//!    [`Validation::Deferred`] verdict is the validity flag. Error details are
//!    *not* read from the validator.
//! 3. **Asynchronous exception**: in asynchronous mode, a rejected deferred
//!    validation carrying error details is an invalid result with those details.
//!    Without details it is an exception, and only its message is compared with
//!    the test case's expected error.
//!
//! A deferred validation outside asynchronous mode is never awaited; it counts as
//! a non-boolean verdict and fails the case.
//!
//! Panics raised by a validator are not caught here.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use futures::FutureExt;
use serde_json::Value;

use crate::error::{Error, TestError};
use crate::loader::ContentLoader;
use crate::options::{AsyncValid, Options};
use crate::outcome::TestResult;
use crate::registration::TestFuture;
use crate::suite::{Expectation, TestCase, TestData};
use crate::trace_categories;
use crate::validator::{ErrorDetails, Rejection, Validation, Validator, Verdict};

/// Joins the validator runs of one test case in asynchronous mode.
pub trait Joiner: Send + Sync {
    /// Returns a future that drives every one of `runs` to completion, then
    /// fails with the first failure in `runs` order, if any.
    fn join_all(&self, runs: Vec<TestFuture>) -> TestFuture;
}

/// Joins runs concurrently with [`futures::future::join_all`].
#[derive(Clone, Copy, Debug, Default)]
pub struct JoinAll;

impl Joiner for JoinAll {
    fn join_all(&self, runs: Vec<TestFuture>) -> TestFuture {
        async move {
            futures::future::join_all(runs)
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
                .map(|_| ())
        }
        .boxed()
    }
}

/// Everything needed to run one test case, resolved at registration time.
#[derive(Clone)]
pub struct CaseContext {
    /// The validators to run, in order.
    pub validators: Arc<[Arc<dyn Validator>]>,
    /// Run options.
    pub options: Arc<Options>,
    /// The schema variant under test.
    pub schema: Arc<Value>,
    /// The test case.
    pub case: Arc<TestCase>,
    /// Directory that `dataFile` references are relative to.
    pub test_dir: Arc<Path>,
}

impl std::fmt::Debug for CaseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseContext")
            .field("validators", &self.validators.len())
            .field("schema", &self.schema)
            .field("case", &self.case.description)
            .field("test_dir", &self.test_dir)
            .finish_non_exhaustive()
    }
}

/// Runs one test case against every validator.
///
/// The case's data is resolved once and shared by every validator. In
/// asynchronous mode the validators run concurrently, all of them run to
/// completion and the first failure fails the case; otherwise they run one
/// after another, stopping at the first failure.
pub async fn run_case(context: CaseContext) -> Result<(), TestError> {
    let data = resolve_data(&context.case, &context.test_dir, context.options.loader.as_ref())?;

    match (&context.options.joiner, context.options.async_mode) {
        (Some(joiner), true) => {
            let runs = context
                .validators
                .iter()
                .map(|validator| {
                    run_validator(Arc::clone(validator), context.clone(), Arc::clone(&data)).boxed()
                })
                .collect();

            joiner.join_all(runs).await
        }
        _ => {
            for validator in context.validators.iter() {
                run_validator(Arc::clone(validator), context.clone(), Arc::clone(&data)).await?;
            }
            Ok(())
        }
    }
}

/// How a single validator answered.
enum Answer {
    /// A validity answer, with any known error details.
    Validity {
        verdict: Option<Verdict>,
        errors: Option<ErrorDetails>,
        /// Whether `errors` must agree with the validity.
        details_known: bool,
    },
    /// A rejection without error details.
    Exception(Rejection),
}

async fn run_validator(
    validator: Arc<dyn Validator>,
    context: CaseContext,
    data: Arc<Value>,
) -> Result<(), TestError> {
    let answer = match validator.validate(&context.schema, &data) {
        Validation::Immediate(verdict) => Answer::Validity {
            verdict: Some(verdict),
            errors: validator.errors(),
            details_known: true,
        },
        Validation::Deferred(deferred) if context.options.async_mode => match deferred.await {
            Ok(verdict) => Answer::Validity {
                verdict: Some(verdict),
                errors: None,
                details_known: false,
            },
            Err(Rejection {
                errors: Some(errors),
                ..
            }) => Answer::Validity {
                verdict: Some(Verdict::Flag(false)),
                errors: Some(errors),
                details_known: true,
            },
            Err(rejection) => Answer::Exception(rejection),
        },
        Validation::Deferred(_) => Answer::Validity {
            verdict: None,
            errors: validator.errors(),
            details_known: false,
        },
    };

    classify(validator, data, &context, answer)
}

fn resolve_data(
    case: &TestCase,
    test_dir: &Path,
    loader: &dyn ContentLoader,
) -> Result<Arc<Value>, Error> {
    match &case.data {
        TestData::Literal(value) => Ok(Arc::clone(value)),
        TestData::File(path) => Ok(Arc::new(loader.load(&test_dir.join(path))?)),
    }
}

fn classify(
    validator: Arc<dyn Validator>,
    data: Arc<Value>,
    context: &CaseContext,
    answer: Answer,
) -> Result<(), TestError> {
    let options = context.options.as_ref();
    let expectation = &context.case.expectation;
    let assert = options.assert.as_ref();

    match answer {
        Answer::Exception(rejection) => {
            let passed = expectation.error() == Some(rejection.message.as_str());

            if !passed && options.log {
                report_mismatch(
                    validator.as_ref(),
                    &Value::String(rejection.message.clone()),
                    expectation,
                    None,
                );
            }

            finish(passed, validator, data, context, None, None);

            assert.equal(
                &Value::String(rejection.message),
                &expectation.error().map_or(Value::Null, |e| Value::String(e.to_owned())),
            )?;
        }
        Answer::Validity {
            verdict,
            errors,
            details_known,
        } => {
            let mut valid = verdict.as_ref().and_then(Verdict::validity);
            if options.async_valid == Some(AsyncValid::Data) && expectation.valid() == Some(true) {
                valid = Some(verdict.as_ref().is_some_and(|v| v.is_strictly(&data)));
            }

            let passed = valid.is_some() && valid == expectation.valid();

            let actual = match (valid, &verdict) {
                (Some(valid), _) => Value::Bool(valid),
                (None, Some(verdict)) => verdict.to_value(),
                (None, None) => Value::String(String::from("<deferred>")),
            };

            if !passed && options.log {
                report_mismatch(
                    validator.as_ref(),
                    &verdict.as_ref().map_or_else(|| actual.clone(), Verdict::to_value),
                    expectation,
                    validator.errors().as_ref(),
                );
            }

            finish(passed, validator, data, context, valid, errors.clone());

            if details_known {
                match valid {
                    Some(true) => assert.ok(
                        errors.as_ref().is_none_or(Vec::is_empty),
                        "valid result reported validation errors",
                    )?,
                    Some(false) => assert.ok(
                        errors.as_ref().is_some_and(|e| !e.is_empty()),
                        "invalid result reported no validation errors",
                    )?,
                    None => (),
                }
            }

            assert.equal(
                &actual,
                &expectation.valid().map_or(Value::Null, Value::Bool),
            )?;

            // A null verdict equals the null standing in for an absent expectation.
            assert.ok(passed, "validator result does not match the expectation")?;
        }
    }

    Ok(())
}

fn finish(
    passed: bool,
    validator: Arc<dyn Validator>,
    data: Arc<Value>,
    context: &CaseContext,
    valid: Option<bool>,
    errors: Option<ErrorDetails>,
) {
    tracing::debug!(
        target: trace_categories::EXECUTION,
        validator = %validator.name(),
        case = %context.case.description,
        passed,
        "finalized"
    );

    let result = TestResult {
        passed,
        validator,
        schema: Arc::clone(&context.schema),
        data,
        valid,
        expectation: context.case.expectation.clone(),
        errors,
    };

    context.options.hooks.dispatch(&result);
}

fn report_mismatch(
    validator: &dyn Validator,
    raw: &Value,
    expectation: &Expectation,
    errors: Option<&ErrorDetails>,
) {
    let expected = match expectation {
        Expectation::Valid(valid) => valid.to_string(),
        Expectation::Error(message) => format!("error {message:?}"),
    };
    let errors = errors.map_or_else(
        || String::from("none"),
        |e| serde_json::to_string(e).unwrap_or_default(),
    );

    eprintln!(
        "{} [{}] result: {}, expected: {}, errors: {}",
        "mismatch".bright_red(),
        validator.name().italic(),
        raw.to_string().bright_red(),
        expected.cyan(),
        errors,
    );
}
