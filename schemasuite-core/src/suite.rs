//! Suite, test group and test case definitions.
//!
//! These are read-only inputs: the engine never mutates them. They deserialize
//! from the suite file format (a JSON or YAML list of test groups):
//!
//! ```yaml
//! - description: integer type
//!   schema: { type: integer }
//!   tests:
//!     - description: an integer is valid
//!       data: 1
//!       valid: true
//!     - description: data from a file
//!       dataFile: data/string.json
//!       valid: false
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::filter::Filter;
use crate::loader::{self, ContentLoader};

/// What a test case expects from a validator. Exactly one mode per case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// The data is expected to be valid (`true`) or invalid (`false`).
    Valid(bool),
    /// The validator is expected to fail with exactly this message.
    Error(String),
}

impl Expectation {
    /// The expected validity, in validity mode.
    pub const fn valid(&self) -> Option<bool> {
        match self {
            Self::Valid(valid) => Some(*valid),
            Self::Error(_) => None,
        }
    }

    /// The expected error message, in exception mode.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid(_) => None,
            Self::Error(message) => Some(message.as_str()),
        }
    }
}

/// The data a test case validates.
#[derive(Clone, Debug, PartialEq)]
pub enum TestData {
    /// A literal value.
    Literal(Arc<Value>),
    /// A file, relative to the suite's directory.
    File(PathBuf),
}

/// A single (data, expected outcome) pair.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawTestCase")]
pub struct TestCase {
    /// Label of the test case.
    pub description: String,
    /// The data to validate.
    pub data: TestData,
    /// The expected outcome.
    pub expectation: Expectation,
    /// Skip this test case.
    pub skip: bool,
    /// Restrict execution to this test case.
    pub only: bool,
}

impl TestCase {
    /// Creates a test case expecting the given validity.
    pub fn valid(description: impl Into<String>, data: Value, valid: bool) -> Self {
        Self::new(description, data, Expectation::Valid(valid))
    }

    /// Creates a test case expecting the validator to fail with `message`.
    pub fn error(description: impl Into<String>, data: Value, message: impl Into<String>) -> Self {
        Self::new(description, data, Expectation::Error(message.into()))
    }

    fn new(description: impl Into<String>, data: Value, expectation: Expectation) -> Self {
        Self {
            description: description.into(),
            data: TestData::Literal(Arc::new(data)),
            expectation,
            skip: false,
            only: false,
        }
    }

    /// Returns the skip/only filter declared on this case.
    pub const fn filter(&self) -> Filter {
        Filter::new(self.skip, self.only)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTestCase {
    description: String,
    #[serde(default)]
    data: Value,
    data_file: Option<PathBuf>,
    valid: Option<bool>,
    error: Option<String>,
    #[serde(default)]
    skip: bool,
    #[serde(default)]
    only: bool,
}

impl TryFrom<RawTestCase> for TestCase {
    type Error = String;

    fn try_from(raw: RawTestCase) -> Result<Self, Self::Error> {
        let expectation = match (raw.valid, raw.error) {
            (Some(valid), None) => Expectation::Valid(valid),
            (None, Some(message)) => Expectation::Error(message),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "test case '{}' declares both 'valid' and 'error'",
                    raw.description
                ));
            }
            (None, None) => {
                return Err(format!(
                    "test case '{}' declares neither 'valid' nor 'error'",
                    raw.description
                ));
            }
        };

        // A named data file takes precedence over inline data.
        let data = match raw.data_file {
            Some(path) => TestData::File(path),
            None => TestData::Literal(Arc::new(raw.data)),
        };

        Ok(Self {
            description: raw.description,
            data,
            expectation,
            skip: raw.skip,
            only: raw.only,
        })
    }
}

/// The schema (or schema variants) of a test group.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupSchema {
    /// One schema.
    Single(Value),
    /// Several schemas, each run against every test case.
    Multiple(Vec<Value>),
}

/// A schema paired with an ordered list of test cases.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawTestGroup")]
pub struct TestGroup {
    /// Label of the group.
    pub description: String,
    /// The schema(s) under test.
    pub schema: GroupSchema,
    /// The test cases, in order.
    pub tests: Vec<TestCase>,
    /// Skip this group.
    pub skip: bool,
    /// Restrict execution to this group.
    pub only: bool,
}

impl TestGroup {
    /// Creates a group with a single schema.
    pub fn new(description: impl Into<String>, schema: Value, tests: Vec<TestCase>) -> Self {
        Self {
            description: description.into(),
            schema: GroupSchema::Single(schema),
            tests,
            skip: false,
            only: false,
        }
    }

    /// Returns the skip/only filter declared on this group.
    pub const fn filter(&self) -> Filter {
        Filter::new(self.skip, self.only)
    }
}

#[derive(Deserialize)]
struct RawTestGroup {
    description: String,
    schema: Option<Value>,
    schemas: Option<Vec<Value>>,
    #[serde(default)]
    tests: Vec<TestCase>,
    #[serde(default)]
    skip: bool,
    #[serde(default)]
    only: bool,
}

impl TryFrom<RawTestGroup> for TestGroup {
    type Error = String;

    fn try_from(raw: RawTestGroup) -> Result<Self, Self::Error> {
        let schema = match (raw.schemas, raw.schema) {
            (Some(schemas), _) if !schemas.is_empty() => GroupSchema::Multiple(schemas),
            (_, Some(schema)) => GroupSchema::Single(schema),
            (Some(_), None) => GroupSchema::Single(Value::Null),
            (None, None) => {
                return Err(format!(
                    "test group '{}' declares neither 'schema' nor 'schemas'",
                    raw.description
                ));
            }
        };

        Ok(Self {
            description: raw.description,
            schema,
            tests: raw.tests,
            skip: raw.skip,
            only: raw.only,
        })
    }
}

/// Where a suite's test groups come from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SuiteSource {
    /// Groups supplied in memory.
    Inline {
        /// The test groups.
        #[serde(rename = "test")]
        groups: Vec<TestGroup>,
    },
    /// Groups loaded from a file when the suite executes.
    Deferred {
        /// Path of the suite file.
        path: PathBuf,
    },
}

/// A named collection of test groups.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NamedSuite {
    /// Display name of the suite.
    pub name: String,
    /// Source of the suite's groups.
    #[serde(flatten)]
    pub source: SuiteSource,
}

/// The groups of a suite along with the directory its data files are relative to.
#[derive(Debug)]
pub struct LoadedSuite<'a> {
    /// The test groups.
    pub groups: Cow<'a, [TestGroup]>,
    /// Directory used to resolve `dataFile` references.
    pub dir: PathBuf,
}

impl NamedSuite {
    /// Creates a suite from in-memory groups.
    pub fn inline(name: impl Into<String>, groups: Vec<TestGroup>) -> Self {
        Self {
            name: name.into(),
            source: SuiteSource::Inline { groups },
        }
    }

    /// Creates a suite loaded from `path` when it executes.
    pub fn deferred(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: SuiteSource::Deferred { path: path.into() },
        }
    }

    /// Resolves this suite's groups. Deferred suites are read through `loader`;
    /// relative paths are taken relative to `cwd`.
    pub fn load(&self, loader: &dyn ContentLoader, cwd: &Path) -> Result<LoadedSuite<'_>, Error> {
        match &self.source {
            SuiteSource::Inline { groups } => Ok(LoadedSuite {
                groups: Cow::Borrowed(groups),
                dir: cwd.to_path_buf(),
            }),
            SuiteSource::Deferred { path } => {
                let path = cwd.join(path);
                let groups = loader::load_groups(loader, &path)?;
                let dir = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

                Ok(LoadedSuite {
                    groups: Cow::Owned(groups),
                    dir,
                })
            }
        }
    }
}

/// A suite specification: inline suites, or a pattern naming suite files.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SuiteSpec {
    /// A file pattern, expanded relative to the configured working directory.
    Pattern(String),
    /// Suites defined inline.
    Inline(Vec<NamedSuite>),
}

impl From<&str> for SuiteSpec {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_owned())
    }
}

impl From<Vec<NamedSuite>> for SuiteSpec {
    fn from(suites: Vec<NamedSuite>) -> Self {
        Self::Inline(suites)
    }
}
