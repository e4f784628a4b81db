//! Configuration types for the harness.

use clap::Parser;

use crate::events::TraceEvent;

/// Output format for test results.
#[derive(Clone, Copy, Default, clap::ValueEnum, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// `JUnit` XML format.
    Junit,
    /// Minimal output.
    Terse,
}

/// Command-line options for the harness.
#[derive(Clone, Parser, Debug)]
#[clap(version, about, disable_help_flag = true, disable_version_flag = true)]
pub struct HarnessOptions {
    /// Display usage information.
    #[clap(long = "help", action = clap::ArgAction::HelpLong)]
    pub help: Option<bool>,

    /// Output format for test results.
    #[clap(long = "format", default_value = "pretty")]
    pub format: OutputFormat,

    /// Display details regarding successful test cases.
    #[clap(short = 'v', long = "verbose", env = "SCHEMASUITE_VERBOSE")]
    pub verbose: bool,

    /// List available tests without running them.
    #[clap(long = "list")]
    pub list_tests_only: bool,

    /// Exactly match filters (not just substring match).
    #[clap(long = "exact")]
    pub exact_match: bool,

    /// Enable tracing of the given event categories.
    #[clap(long = "trace", value_enum)]
    pub trace_events: Vec<TraceEvent>,

    /// Show output from test cases (for compatibility only, has no effect).
    #[clap(long = "show-output")]
    pub show_output: bool,

    /// Capture output? (for compatibility only, has no effect).
    #[clap(long = "nocapture")]
    pub no_capture: bool,

    /// Colorize output? (for compatibility only, has no effect).
    #[clap(long = "color", default_value_t = clap::ColorChoice::Auto)]
    pub color: clap::ColorChoice,

    /// Unstable flags (for compatibility only, has no effect).
    #[clap(short = 'Z')]
    pub unstable_flag: Vec<String>,

    /// Patterns for tests to be excluded.
    #[clap(long = "skip")]
    pub exclude_filters: Vec<String>,

    /// Patterns for tests to be included.
    pub include_filters: Vec<String>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            help: None,
            format: OutputFormat::default(),
            verbose: false,
            list_tests_only: false,
            exact_match: false,
            trace_events: vec![],
            show_output: false,
            no_capture: false,
            color: clap::ColorChoice::Auto,
            unstable_flag: vec![],
            exclude_filters: vec![],
            include_filters: vec![],
        }
    }
}

impl HarnessOptions {
    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Adds an include filter.
    #[must_use]
    pub fn with_include(mut self, filter: impl Into<String>) -> Self {
        self.include_filters.push(filter.into());
        self
    }

    /// Adds an exclude filter.
    #[must_use]
    pub fn with_exclude(mut self, filter: impl Into<String>) -> Self {
        self.exclude_filters.push(filter.into());
        self
    }

    /// Requires filters to match qualified names exactly.
    #[must_use]
    pub const fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    /// Returns whether a test should run based on include/exclude filters.
    pub fn should_run_test(&self, qualified_name: &str) -> bool {
        if self.include_filters.is_empty() && self.exclude_filters.is_empty() {
            return true;
        }

        // If any include filters were given, then we are in opt-in mode.
        if !self.include_filters.is_empty()
            && !self.test_matches_filters(qualified_name, &self.include_filters)
        {
            return false;
        }

        // In all cases, exclude filters may be used to exclude tests.
        if !self.exclude_filters.is_empty()
            && self.test_matches_filters(qualified_name, &self.exclude_filters)
        {
            return false;
        }

        true
    }

    fn test_matches_filters(&self, qualified_test_name: &str, filters: &[String]) -> bool {
        if self.exact_match {
            filters.iter().any(|f| f == qualified_test_name)
        } else {
            filters
                .iter()
                .any(|filter| qualified_test_name.contains(filter))
        }
    }
}
