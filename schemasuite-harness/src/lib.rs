//! In-process host for schemasuite conformance tests.
//!
//! Records the groups and leaf tests a [`schemasuite_core::ConformanceTests`]
//! registers into a [`TestTree`], then runs the selected leaves with
//! [`TestRunner`] and reports them in one of several formats:
//!
//! 1. **Pretty**: colored per-failure details on stderr, followed by a summary.
//! 2. **Terse**: one line per failing leaf.
//! 3. **`JUnit`**: an XML report on stdout.
//!
//! [`HarnessOptions`] parses cargo-test style arguments, so a `harness = false`
//! test target can hand its command line straight to the runner.

mod config;
mod events;
mod reporting;
mod runner;
mod tree;

pub use config::{HarnessOptions, OutputFormat};
pub use events::{TraceEvent, TraceEventConfig};
pub use reporting::{LeafResult, Outcome, RunSummary};
pub use runner::TestRunner;
pub use tree::{PlannedTest, TestTree};
