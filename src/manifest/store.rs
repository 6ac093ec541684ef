//! Loading and querying the bundler's `manifest.json`.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, ViteError};

/// A single build output as recorded in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
  /// Hashed output file, relative to the build URL prefix.
  pub file: String,
  /// Keys of other manifest entries this chunk imports.
  #[serde(default)]
  pub imports: Vec<String>,
  /// Stylesheets extracted from this chunk.
  #[serde(default)]
  pub css: Vec<String>,
}

/// Logical source path to build output mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
  entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
  /// Read a manifest from disk.
  ///
  /// A missing file yields an empty manifest so dev-only checkouts keep working without a build.
  pub fn load(path: &Path) -> Result<Self> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        warn!("Cannot read Vite manifest file at {}", path.display());
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(ViteError::ManifestRead {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let manifest: Manifest =
      serde_json::from_str(&content).map_err(|err| ViteError::ManifestParse {
        path: path.to_path_buf(),
        source: err,
      })?;
    debug!(
      path = %path.display(),
      entries = manifest.len(),
      "loaded Vite manifest"
    );
    Ok(manifest)
  }

  /// Look up an entry, failing when the build does not contain `key`.
  pub fn get(&self, key: &str) -> Result<&ManifestEntry> {
    self
      .entries
      .get(key)
      .ok_or_else(|| ViteError::MissingManifestEntry {
        key: key.to_string(),
      })
  }

  /// Whether `key` is part of the build.
  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K: Into<String>> FromIterator<(K, ManifestEntry)> for Manifest {
  fn from_iter<I: IntoIterator<Item = (K, ManifestEntry)>>(iter: I) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(key, entry)| (key.into(), entry))
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn parses_vite_manifest_and_ignores_extra_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    fs::write(
      &path,
      r#"{
        "main.js": {
          "file": "assets/main-abc.js",
          "src": "main.js",
          "isEntry": true,
          "imports": ["_shared.js"],
          "css": ["assets/main-abc.css"]
        },
        "_shared.js": { "file": "assets/shared-def.js" }
      }"#,
    )
    .unwrap();

    let manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.len(), 2);

    let entry = manifest.get("main.js").unwrap();
    assert_eq!(entry.file, "assets/main-abc.js");
    assert_eq!(entry.imports, vec!["_shared.js".to_string()]);
    assert_eq!(entry.css, vec!["assets/main-abc.css".to_string()]);
    assert!(manifest.get("_shared.js").unwrap().css.is_empty());
  }

  #[test]
  fn missing_file_yields_empty_manifest() {
    let dir = tempdir().unwrap();
    let manifest = Manifest::load(&dir.path().join("absent.json")).unwrap();
    assert!(manifest.is_empty());
  }

  #[test]
  fn malformed_file_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    fs::write(&path, "{ \"main.js\": ").unwrap();

    let err = Manifest::load(&path).unwrap_err();
    assert!(matches!(err, ViteError::ManifestParse { .. }));
  }

  #[test]
  fn unreadable_path_is_fatal() {
    let dir = tempdir().unwrap();

    let err = Manifest::load(dir.path()).unwrap_err();
    assert!(matches!(err, ViteError::ManifestRead { ref path, .. } if path == dir.path()));
  }

  #[test]
  fn unknown_key_is_reported() {
    let manifest = Manifest::default();
    let err = manifest.get("app.js").unwrap_err();
    assert!(matches!(err, ViteError::MissingManifestEntry { ref key } if key == "app.js"));
    assert_eq!(err.to_string(), "cannot find app.js in Vite manifest");
  }
}
