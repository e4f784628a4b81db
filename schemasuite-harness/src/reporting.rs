//! Reporting utilities for test results.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use schemasuite_core::AssertionError;

use crate::config::{HarnessOptions, OutputFormat};

/// How a leaf test ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The test passed.
    Passed,
    /// The validator disagreed with the test's expectation.
    Failed(AssertionError),
    /// The test could not complete: data load failure, panic or timeout.
    Errored(String),
    /// The test was not selected to run.
    Skipped,
}

/// Result of running a single leaf test.
#[derive(Clone, Debug)]
pub struct LeafResult {
    /// Labels of the enclosing groups, outermost first.
    pub path: Vec<String>,
    /// Label of the test.
    pub name: String,
    /// How the test ended.
    pub outcome: Outcome,
    /// How long the test ran.
    pub duration: Duration,
}

impl LeafResult {
    /// Returns the `::`-separated path and name of the test.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join("::")
    }

    /// Returns whether the test failed or errored.
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_) | Outcome::Errored(_))
    }

    /// Writes the details of this result to a writer.
    pub fn write_details<W: Write>(&self, mut writer: W, options: &HarnessOptions) -> Result<()> {
        if matches!(self.outcome, Outcome::Skipped) {
            return Ok(());
        }

        if !options.verbose && !self.is_failure() {
            return Ok(());
        }

        write!(
            writer,
            "* {}: [{}]... ",
            "Test case".bright_yellow(),
            self.name.italic()
        )?;

        match &self.outcome {
            Outcome::Passed | Outcome::Skipped => {
                writeln!(writer, "{}", "ok.".bright_green())?;
            }
            Outcome::Failed(error) => {
                writeln!(writer)?;
                writeln!(writer, "    {} {}", "Assertion:".cyan(), error.message)?;

                if let Some(expected) = &error.expected {
                    writeln!(writer, "      expected:")?;
                    writeln!(writer, "{}", indent::indent_all_by(8, pretty_json(expected)))?;
                }
                if let Some(actual) = &error.actual {
                    writeln!(writer, "      actual:")?;
                    writeln!(writer, "{}", indent::indent_all_by(8, pretty_json(actual)))?;
                }

                writeln!(writer, "    {}", "FAILED.".bright_red())?;
            }
            Outcome::Errored(message) => {
                writeln!(writer)?;
                writeln!(writer, "{}", indent::indent_all_by(4, message.as_str()))?;
                writeln!(writer, "    {}", "ERRORED.".bright_red())?;
            }
        }

        Ok(())
    }
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Results of a complete run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Individual leaf results, in registration order.
    pub results: Vec<LeafResult>,
    /// Number of passed tests.
    pub passed: u32,
    /// Number of failed tests.
    pub failed: u32,
    /// Number of tests that could not complete.
    pub errored: u32,
    /// Number of skipped tests.
    pub skipped: u32,
    /// Total duration of passed tests.
    pub success_duration: Duration,
}

impl RunSummary {
    /// Adds a leaf result to the summary.
    pub fn record(&mut self, result: LeafResult) {
        match result.outcome {
            Outcome::Passed => {
                self.passed += 1;
                self.success_duration += result.duration;
            }
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Errored(_) => self.errored += 1,
            Outcome::Skipped => self.skipped += 1,
        }

        self.results.push(result);
    }

    /// Returns whether no test failed or errored.
    pub const fn success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    /// Looks up a result by qualified name.
    pub fn find(&self, qualified_name: &str) -> Option<&LeafResult> {
        self.results
            .iter()
            .find(|r| r.qualified_name() == qualified_name)
    }

    /// Splits the results into runs of consecutive leaves sharing the same
    /// enclosing groups.
    fn suites(&self) -> Vec<(String, Vec<&LeafResult>)> {
        let mut suites: Vec<(String, Vec<&LeafResult>)> = vec![];

        for result in &self.results {
            let name = result.path.join("::");
            match suites.last_mut() {
                Some((last, members)) if *last == name => members.push(result),
                _ => suites.push((name, vec![result])),
            }
        }

        suites
    }
}

/// Reports test results based on the configured output format.
pub fn report_results(summary: &RunSummary, options: &HarnessOptions) -> Result<()> {
    match options.format {
        OutputFormat::Pretty => report_results_pretty(summary, std::io::stderr(), options),
        OutputFormat::Junit => report_results_junit(summary, std::io::stdout(), options),
        OutputFormat::Terse => report_results_terse(summary, std::io::stderr()),
    }
}

fn report_results_pretty<W: Write>(
    summary: &RunSummary,
    mut writer: W,
    options: &HarnessOptions,
) -> Result<()> {
    for (name, results) in summary.suites() {
        let shows_any = options.verbose || results.iter().any(|r| r.is_failure());
        if shows_any {
            writeln!(
                writer,
                "=================== {}: [{}] ===================",
                "Running suite".blue(),
                name.italic(),
            )?;
        }

        for result in results {
            result.write_details(&mut writer, options)?;
        }
    }

    Ok(())
}

fn report_results_terse<W: Write>(summary: &RunSummary, mut writer: W) -> Result<()> {
    for result in summary.results.iter().filter(|r| r.is_failure()) {
        let label = if matches!(result.outcome, Outcome::Failed(_)) {
            "FAILED"
        } else {
            "ERRORED"
        };
        writeln!(writer, "{}: {label}", result.qualified_name())?;
    }

    Ok(())
}

fn report_results_junit<W: Write>(
    summary: &RunSummary,
    mut writer: W,
    options: &HarnessOptions,
) -> Result<()> {
    let mut report = junit_report::Report::new();

    for (name, results) in summary.suites() {
        let mut suite = junit_report::TestSuite::new(name.as_str());
        for r in results {
            let duration = r.duration.try_into()?;
            let mut test_case = match &r.outcome {
                Outcome::Passed => junit_report::TestCase::success(&r.name, duration),
                Outcome::Skipped => junit_report::TestCase::skipped(&r.name),
                Outcome::Failed(error) => junit_report::TestCase::failure(
                    &r.name,
                    duration,
                    "assertion",
                    error.message.as_str(),
                ),
                Outcome::Errored(message) => {
                    junit_report::TestCase::error(&r.name, duration, "error", message.as_str())
                }
            };

            let mut output_buf: Vec<u8> = vec![];
            r.write_details(&mut output_buf, options)?;

            let output_as_string = String::from_utf8(output_buf)?;
            test_case.set_system_out(strip_ansi_escapes::strip_str(output_as_string).as_str());

            suite.add_testcase(test_case);
        }

        report.add_testsuite(suite);
    }

    report.write_xml(&mut writer)?;
    writeln!(writer)?;

    Ok(())
}
