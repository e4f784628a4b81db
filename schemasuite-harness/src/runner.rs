//! Test runner implementation.

use std::any::Any;
use std::time::{Duration, Instant};

use anyhow::Result;
use colored::Colorize;
use schemasuite_core::{ConformanceTests, TestError};

use crate::config::{HarnessOptions, OutputFormat};
use crate::reporting::{LeafResult, Outcome, RunSummary};
use crate::tree::{PlannedTest, TestTree};

/// The main test runner.
pub struct TestRunner {
    options: HarnessOptions,
}

impl TestRunner {
    /// Creates a new test runner with the given options.
    pub const fn new(options: HarnessOptions) -> Self {
        Self { options }
    }

    /// Registers `tests` into a fresh tree and runs it.
    pub async fn run_conformance(&self, tests: &ConformanceTests) -> Result<RunSummary> {
        let mut tree = TestTree::new();
        tests.register(&mut tree)?;

        if self.options.verbose {
            eprintln!("Registered {} test case(s)", tree.leaf_count());
        }

        self.run(tree).await
    }

    /// Runs the selected leaves of `tree` one after another and reports the results.
    pub async fn run(&self, tree: TestTree) -> Result<RunSummary> {
        let plan = tree.into_plan(&self.options);
        let mut summary = RunSummary::default();

        if self.options.list_tests_only {
            for test in plan.iter().filter(|t| t.selected) {
                println!("{}: test", test.qualified_name());
            }
            return Ok(summary);
        }

        for test in plan {
            summary.record(run_single_test(test).await);
        }

        crate::reporting::report_results(&summary, &self.options)?;

        if matches!(self.options.format, OutputFormat::Pretty) {
            report_banner(&summary);
        }

        Ok(summary)
    }
}

fn report_banner(summary: &RunSummary) {
    let formatted_fail_count = if summary.failed > 0 {
        summary.failed.to_string().red()
    } else {
        summary.failed.to_string().green()
    };

    let formatted_error_count = if summary.errored > 0 {
        summary.errored.to_string().magenta()
    } else {
        summary.errored.to_string().green()
    };

    let formatted_skip_count = if summary.skipped > 0 {
        summary.skipped.to_string().cyan()
    } else {
        summary.skipped.to_string().green()
    };

    eprintln!("================================================================================");
    eprintln!(
        "{} test case(s) ran: {} succeeded, {} failed, {} errored, {} skipped.",
        summary.passed + summary.failed + summary.errored,
        summary.passed.to_string().green(),
        formatted_fail_count,
        formatted_error_count,
        formatted_skip_count,
    );
    eprintln!("duration of successful tests: {:?}", summary.success_duration);
    eprintln!("================================================================================");
}

/// Runs one leaf on its own task, so that a panicking validator or hook only
/// takes down that leaf.
async fn run_single_test(test: PlannedTest) -> LeafResult {
    let PlannedTest {
        path,
        name,
        selected,
        timeout,
        body,
    } = test;

    if !selected {
        return LeafResult {
            path,
            name,
            outcome: Outcome::Skipped,
            duration: Duration::ZERO,
        };
    }

    let start_time = Instant::now();
    let mut handle = tokio::spawn(async move { body().await });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => Some(joined),
            Err(_) => {
                handle.abort();
                None
            }
        },
        None => Some(handle.await),
    };

    let outcome = match joined {
        Some(Ok(Ok(()))) => Outcome::Passed,
        Some(Ok(Err(TestError::Assertion(error)))) => Outcome::Failed(error),
        Some(Ok(Err(error))) => Outcome::Errored(error.to_string()),
        Some(Err(error)) if error.is_panic() => Outcome::Errored(format!(
            "panicked: {}",
            panic_message(error.into_panic().as_ref())
        )),
        Some(Err(error)) => Outcome::Errored(error.to_string()),
        None => Outcome::Errored(format!(
            "timed out after {}ms",
            timeout.map_or(0, |t| t.as_millis())
        )),
    };

    LeafResult {
        path,
        name,
        outcome,
        duration: start_time.elapsed(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "(non-string panic payload)"
    }
}
