//! Error types raised while resolving assets.
//!
//! Every variant here is fatal for the render call that hit it. Expected absences (a missing
//! manifest file in a dev-only checkout, a static lookup miss) are not errors and never reach
//! this type.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ViteError>;

/// Failures surfaced by manifest resolution and tag rendering.
#[derive(Debug, Error)]
pub enum ViteError {
    /// The manifest exists but could not be read.
    #[error("cannot read Vite manifest file at {}: {source}", path.display())]
    ManifestRead {
        /// Manifest location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid JSON or does not have the expected shape.
    #[error("cannot parse Vite manifest file at {}: {source}", path.display())]
    ManifestParse {
        /// Manifest location.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// An asset referenced in markup is not part of the build.
    #[error("cannot find {key} in Vite manifest")]
    MissingManifestEntry {
        /// The logical asset key that was requested.
        key: String,
    },

    /// The manifest imports form a loop.
    #[error("Vite manifest imports form a cycle: {}", chain.join(" -> "))]
    CyclicManifest {
        /// Keys along the cycle, starting and ending with the repeated key.
        chain: Vec<String>,
    },

    /// The hot file could not be read, so no dev server is running.
    #[error(
        "Vite dev server is not started! Could not read {}; run the Vite dev server or disable DEV_MODE",
        hot_file.display()
    )]
    DevServerUnavailable {
        /// Hot file location.
        hot_file: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The host settings file could not be loaded.
    #[error("invalid settings file at {}: {message}", path.display())]
    Settings {
        /// Settings file location.
        path: PathBuf,
        /// Human readable reason.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_chain() {
        let err = ViteError::CyclicManifest {
            chain: vec!["a.js".into(), "b.js".into(), "a.js".into()],
        };
        assert_eq!(
            err.to_string(),
            "Vite manifest imports form a cycle: a.js -> b.js -> a.js"
        );
    }

    #[test]
    fn dev_server_message_names_hot_file() {
        let err = ViteError::DevServerUnavailable {
            hot_file: PathBuf::from("/srv/app/.vite/hot"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let message = err.to_string();
        assert!(message.starts_with("Vite dev server is not started!"));
        assert!(message.contains("/srv/app/.vite/hot"));
    }
}
