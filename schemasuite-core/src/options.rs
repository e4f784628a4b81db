//! Configuration of a conformance run.
//!
//! The serializable subset of [`Options`] may be loaded from a YAML or JSON
//! file with [`Options::from_file`]; keys follow the suite file's camelCase
//! convention:
//!
//! ```yaml
//! description: draft-07 conformance
//! suites:
//!   draft7: tests/draft7/*.json
//! async: true
//! asyncValid: data
//! skip: [draft7/refRemote]
//! hideFolder: draft7/
//! timeout: 5000
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::assert::{Assert, StrictAssert};
use crate::catalog::{GlobMatcher, PatternMatcher};
use crate::error::Error;
use crate::execution::{JoinAll, Joiner};
use crate::filter::Selector;
use crate::loader::{self, ContentLoader, FsLoader};
use crate::outcome::{Hooks, TestResult};
use crate::suite::SuiteSpec;

/// Label of the top-level group when none is configured.
pub const DEFAULT_DESCRIPTION: &str = "JSON schema tests";

/// Alternative definitions of a "valid" outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsyncValid {
    /// A valid outcome is the validator handing back the input data itself.
    Data,
}

/// Options for a conformance run.
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Label of the top-level group.
    pub description: String,
    /// Suite groups, by name, in registration order.
    pub suites: IndexMap<String, SuiteSpec>,
    /// Enables the asynchronous protocol and validator fan-out.
    #[serde(rename = "async")]
    pub async_mode: bool,
    /// Redefines "valid" for cases expecting valid data.
    pub async_valid: Option<AsyncValid>,
    /// Print a diagnostic when a validator disagrees with an expectation.
    pub log: bool,
    /// Only selector: `true` for the whole run, or a list of suite names.
    /// Names are matched against suites, never against the `suites` map keys.
    pub only: Selector,
    /// Skip selector: `true` for the whole run, or a list of suite names.
    /// Names are matched against suites, never against the `suites` map keys.
    pub skip: Selector,
    /// Base directory for suite patterns; the process directory when unset.
    pub cwd: Option<PathBuf>,
    /// Folder prefix omitted from derived suite names.
    pub hide_folder: Option<String>,
    /// Timeout in milliseconds, forwarded to the top-level group.
    #[serde(rename = "timeout")]
    pub timeout_ms: Option<u64>,
    /// Result hooks.
    #[serde(skip)]
    pub hooks: Hooks,
    /// Assertion primitive.
    #[serde(skip, default = "default_assert")]
    pub assert: Arc<dyn Assert>,
    /// Joins the validator runs of one test case in asynchronous mode.
    #[serde(skip, default = "default_joiner")]
    pub joiner: Option<Arc<dyn Joiner>>,
    /// Loads suite and data files.
    #[serde(skip, default = "default_loader")]
    pub loader: Arc<dyn ContentLoader>,
    /// Expands suite patterns.
    #[serde(skip, default = "default_matcher")]
    pub matcher: Arc<dyn PatternMatcher>,
}

fn default_assert() -> Arc<dyn Assert> {
    Arc::new(StrictAssert)
}

fn default_joiner() -> Option<Arc<dyn Joiner>> {
    Some(Arc::new(JoinAll))
}

fn default_loader() -> Arc<dyn ContentLoader> {
    Arc::new(FsLoader)
}

fn default_matcher() -> Arc<dyn PatternMatcher> {
    Arc::new(GlobMatcher)
}

impl Default for Options {
    fn default() -> Self {
        Self {
            description: String::from(DEFAULT_DESCRIPTION),
            suites: IndexMap::new(),
            async_mode: false,
            async_valid: None,
            log: true,
            only: Selector::default(),
            skip: Selector::default(),
            cwd: None,
            hide_folder: None,
            timeout_ms: None,
            hooks: Hooks::default(),
            assert: default_assert(),
            joiner: default_joiner(),
            loader: default_loader(),
            matcher: default_matcher(),
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("description", &self.description)
            .field("suites", &self.suites)
            .field("async_mode", &self.async_mode)
            .field("async_valid", &self.async_valid)
            .field("log", &self.log)
            .field("only", &self.only)
            .field("skip", &self.skip)
            .field("cwd", &self.cwd)
            .field("hide_folder", &self.hide_folder)
            .field("timeout_ms", &self.timeout_ms)
            .field("hooks", &self.hooks)
            .field("joiner", &self.joiner.is_some())
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Loads options from a YAML (`.yaml`/`.yml`) or JSON file. Relative `cwd`
    /// values are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::Read(path.to_path_buf(), e))?;

        let mut options: Self = if loader::is_yaml(path) {
            serde_yaml::from_str(&contents).map_err(|e| Error::Yaml(path.to_path_buf(), e))?
        } else {
            serde_json::from_str(&contents).map_err(|e| Error::Json(path.to_path_buf(), e))?
        };

        if let Some(base) = path.parent() {
            options.cwd = Some(match options.cwd.take() {
                Some(cwd) => base.join(cwd),
                None => base.to_path_buf(),
            });
        }

        Ok(options)
    }

    /// Adds a suite group.
    #[must_use]
    pub fn with_suite(mut self, name: impl Into<String>, spec: impl Into<SuiteSpec>) -> Self {
        self.suites.insert(name.into(), spec.into());
        self
    }

    /// Sets the top-level group label.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Enables or disables the asynchronous protocol.
    #[must_use]
    pub const fn with_async(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// Sets the definition of a valid outcome.
    #[must_use]
    pub const fn with_async_valid(mut self, async_valid: Option<AsyncValid>) -> Self {
        self.async_valid = async_valid;
        self
    }

    /// Enables or disables mismatch diagnostics.
    #[must_use]
    pub const fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Sets the only selector.
    #[must_use]
    pub fn with_only(mut self, only: Selector) -> Self {
        self.only = only;
        self
    }

    /// Sets the skip selector.
    #[must_use]
    pub fn with_skip(mut self, skip: Selector) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the base directory for suite patterns.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Sets the folder prefix omitted from derived suite names.
    #[must_use]
    pub fn with_hide_folder(mut self, folder: impl Into<String>) -> Self {
        self.hide_folder = Some(folder.into());
        self
    }

    /// Sets the timeout forwarded to the top-level group.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Sets the hook called for every result.
    #[must_use]
    pub fn after_each(mut self, hook: impl Fn(&TestResult) + Send + Sync + 'static) -> Self {
        self.hooks.after_each = Some(Arc::new(hook));
        self
    }

    /// Sets the hook called for every failed result.
    #[must_use]
    pub fn after_error(mut self, hook: impl Fn(&TestResult) + Send + Sync + 'static) -> Self {
        self.hooks.after_error = Some(Arc::new(hook));
        self
    }

    /// Sets the assertion primitive.
    #[must_use]
    pub fn with_assert(mut self, assert: Arc<dyn Assert>) -> Self {
        self.assert = assert;
        self
    }

    /// Sets (or removes) the joiner used for validator fan-out.
    #[must_use]
    pub fn with_joiner(mut self, joiner: Option<Arc<dyn Joiner>>) -> Self {
        self.joiner = joiner;
        self
    }

    /// Sets the content loader.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn ContentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Sets the pattern matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<dyn PatternMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// The timeout forwarded to the top-level group.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Returns the configured base directory, or the process directory.
    pub fn resolved_cwd(&self) -> Result<PathBuf, Error> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir()
                .map_err(|e| Error::Config(format!("cannot determine working directory: {e}"))),
        }
    }

    /// Checks that these options can drive `validator_count` validators.
    pub fn check(&self, validator_count: usize) -> Result<(), Error> {
        if validator_count == 0 {
            return Err(Error::Config(String::from("at least one validator is required")));
        }

        if self.async_mode && self.joiner.is_none() {
            return Err(Error::Config(String::from(
                "asynchronous mode requires a joiner",
            )));
        }

        Ok(())
    }
}
