use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::HostSettings;

/// Locates a logical static file reference on disk.
pub trait StaticFinder: Send + Sync {
    /// Absolute path of the first match for `path`, if any.
    fn find(&self, path: &str) -> Option<PathBuf>;
}

impl<F> StaticFinder for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn find(&self, path: &str) -> Option<PathBuf> {
        self(path)
    }
}

/// Searches a list of static directories in order; the first existing file wins.
#[derive(Debug, Clone, Default)]
pub struct StaticDirsFinder {
    roots: Vec<PathBuf>,
}

impl StaticDirsFinder {
    /// Search exactly `roots`.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Search the configured static directories, then the `static/` directory of each installed
    /// app.
    pub fn from_host(host: &HostSettings) -> Self {
        let mut roots: Vec<PathBuf> = host
            .staticfiles_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    host.base_dir.join(dir)
                }
            })
            .collect();
        roots.extend(
            host.installed_apps
                .iter()
                .map(|app| host.app_dir(app).join("static")),
        );
        Self { roots }
    }

    /// Directories searched, in order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl StaticFinder for StaticDirsFinder {
    fn find(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches(['/', '\\']));
        let escapes_root = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes_root || relative.as_os_str().is_empty() {
            return None;
        }

        let found = self
            .roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file());
        debug!(path, found = ?found, "static lookup");
        found
    }
}
