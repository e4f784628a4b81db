//! Conformance-test orchestration for schema validators. Discovers test suites,
//! registers them with a host test framework, runs one or more validators over
//! every test case, and checks the outcome against each case's expectation.

pub mod assert;
pub mod catalog;
mod engine;
mod error;
pub mod execution;
pub mod filter;
pub mod loader;
pub mod options;
pub mod outcome;
pub mod registration;
pub mod schemas;
pub mod suite;
mod trace_categories;
pub mod validator;

pub use assert::{Assert, AssertionError, StrictAssert};
pub use engine::ConformanceTests;
pub use error::{Error, TestError};
pub use execution::{JoinAll, Joiner};
pub use filter::{Filter, Selector};
pub use options::{AsyncValid, Options};
pub use outcome::{Hooks, TestResult};
pub use registration::{Registrar, TestFn, Variant};
pub use suite::{Expectation, NamedSuite, SuiteSpec, TestCase, TestData, TestGroup};
pub use validator::{ErrorDetails, Rejection, Validation, Validator, Verdict};
