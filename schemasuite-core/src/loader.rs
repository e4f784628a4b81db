//! Loading of suite and data files.

use std::path::Path;

use serde_json::Value;

use crate::error::Error;
use crate::suite::TestGroup;
use crate::trace_categories;

/// Loads the structured content named by a path.
pub trait ContentLoader: Send + Sync {
    /// Loads and parses the content at `path`.
    fn load(&self, path: &Path) -> Result<Value, Error>;
}

/// Loads files from the file system, parsing `.yaml`/`.yml` files as YAML and
/// everything else as JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

impl ContentLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<Value, Error> {
        tracing::debug!(target: trace_categories::DISCOVERY, "loading {}", path.display());

        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::Read(path.to_path_buf(), e))?;

        if is_yaml(path) {
            serde_yaml::from_str(&contents).map_err(|e| Error::Yaml(path.to_path_buf(), e))
        } else {
            serde_json::from_str(&contents).map_err(|e| Error::Json(path.to_path_buf(), e))
        }
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Loads the test groups of a suite file.
pub fn load_groups(loader: &dyn ContentLoader, path: &Path) -> Result<Vec<TestGroup>, Error> {
    let content = loader.load(path)?;
    serde_json::from_value(content).map_err(|e| Error::InvalidSuite(path.to_path_buf(), e))
}
