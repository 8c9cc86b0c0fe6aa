//! Module name to dependency manifest mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Modules shipped with this workspace, relative to the workspace root.
pub const MODULES: &[(&str, &str)] = &[
    ("commons", "modules/commons/Cargo.toml"),
    ("visualisations", "modules/visualisations/Cargo.toml"),
];

const MANIFEST: &str = "Cargo.toml";

/// Name to manifest path table, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, PathBuf>,
}

impl Registry {
    /// The table compiled into the crate.
    pub fn builtin() -> Self {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        MODULES
            .iter()
            .map(|(name, manifest)| (name.to_string(), root.join(manifest)))
            .collect()
    }

    /// Every sub-directory of `dir` holding a `Cargo.toml`.
    ///
    /// Names starting with `.` or `_` are skipped, as are directories
    /// without a manifest.
    pub fn discover(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut registry = Self::default();
        for entry in fs::read_dir(dir.as_ref())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }
            let manifest = entry.path().join(MANIFEST);
            if manifest.is_file() {
                registry.entries.insert(name, manifest);
            } else {
                debug!("Skipping {}: no {}", name, MANIFEST);
            }
        }
        Ok(registry)
    }

    /// Manifest path for `name`. Existence is not checked.
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Manual install command for a module.
    pub fn install_command(&self, name: &str) -> Option<String> {
        self.entries.contains_key(name).then(|| {
            format!(
                "cargo add messylib --no-default-features --features {}",
                name
            )
        })
    }
}

impl FromIterator<(String, PathBuf)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
