//! Resolution of suite specifications into named suites.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::filter::{Filter, Selector};
use crate::suite::{NamedSuite, SuiteSpec};
use crate::trace_categories;

/// Expands a file pattern into the matching paths, relative to `cwd`.
pub trait PatternMatcher: Send + Sync {
    /// Returns the paths matching `pattern`, relative to `cwd`.
    fn expand(&self, pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>, Error>;
}

/// Matches patterns with the `glob` crate. Results are sorted.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobMatcher;

impl PatternMatcher for GlobMatcher {
    fn expand(&self, pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>, Error> {
        let full_pattern = cwd.join(pattern).to_string_lossy().to_string();

        let entries = glob::glob(&full_pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            message: e.to_string(),
        })?;

        let mut paths = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| Error::PatternMatch(e.path().to_path_buf(), e.into()))?;
            let relative = entry
                .strip_prefix(cwd)
                .map_or_else(|_| entry.clone(), Path::to_path_buf);
            paths.push(relative);
        }

        paths.sort();
        Ok(paths)
    }
}

/// Settings consulted while resolving suites.
#[derive(Clone, Copy, Debug)]
pub struct CatalogSettings<'a> {
    /// Base directory for pattern expansion.
    pub cwd: &'a Path,
    /// Folder prefix to omit from derived names (e.g. `"draft4/"`).
    pub hide_folder: Option<&'a str>,
    /// Skip selector from configuration.
    pub skip: &'a Selector,
    /// Only selector from configuration.
    pub only: &'a Selector,
}

/// A resolved suite along with its name-scoped filter.
#[derive(Clone, Debug)]
pub struct CatalogEntry<'a> {
    /// The suite.
    pub suite: Cow<'a, NamedSuite>,
    /// Filter derived from name-list selectors.
    pub filter: Filter,
}

/// Resolves a suite specification into an ordered list of named suites.
pub fn resolve_suites<'a>(
    spec: &'a SuiteSpec,
    settings: &CatalogSettings<'_>,
    matcher: &dyn PatternMatcher,
) -> Result<Vec<CatalogEntry<'a>>, Error> {
    let suites: Vec<Cow<'a, NamedSuite>> = match spec {
        SuiteSpec::Inline(suites) => suites.iter().map(Cow::Borrowed).collect(),
        SuiteSpec::Pattern(pattern) => {
            let matches = matcher.expand(pattern, settings.cwd)?;

            tracing::debug!(
                target: trace_categories::DISCOVERY,
                "pattern {pattern} matched {} file(s)",
                matches.len()
            );

            matches
                .iter()
                .map(|relative| {
                    Cow::Owned(NamedSuite::deferred(
                        display_name(relative, settings.hide_folder),
                        settings.cwd.join(relative),
                    ))
                })
                .collect()
        }
    };

    Ok(suites
        .into_iter()
        .map(|suite| {
            let filter = Filter::for_name(settings.skip, settings.only, &suite.name);
            CatalogEntry { suite, filter }
        })
        .collect())
}

/// Derives a suite's display name from its path: the immediate parent folder
/// (with a trailing `/`) followed by the file stem. The folder is omitted when
/// it equals `hide_folder`.
pub fn display_name(relative: &Path, hide_folder: Option<&str>) -> String {
    let stem = match relative.extension().and_then(|ext| ext.to_str()) {
        Some("json" | "yaml" | "yml") => relative.file_stem(),
        _ => relative.file_name(),
    }
    .map(|s| s.to_string_lossy().to_string())
    .unwrap_or_default();

    let folder = relative
        .parent()
        .and_then(|parent| parent.file_name())
        .map(|name| format!("{}/", name.to_string_lossy()))
        .unwrap_or_default();

    if hide_folder == Some(folder.as_str()) {
        stem
    } else {
        folder + stem.as_str()
    }
}
