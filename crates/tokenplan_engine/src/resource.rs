use std::env;
use std::path::{Path, PathBuf};

/// Resolves relative resource paths: the working directory first, then the
/// bundle root of a packaged install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResolver {
    working_dir: PathBuf,
    bundle_root: Option<PathBuf>,
}

impl ResourceResolver {
    pub fn new(working_dir: impl Into<PathBuf>, bundle_root: Option<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            bundle_root,
        }
    }

    /// Resolves against the directory holding `config_path`, with the
    /// executable's directory as bundle root.
    pub fn for_config(config_path: &Path) -> Self {
        let working_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let bundle_root = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::new(working_dir, bundle_root)
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Absolute paths pass through. A relative path that exists under neither
    /// root resolves under the working directory so errors name a sensible path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let local = self.working_dir.join(path);
        if local.exists() {
            return local;
        }
        if let Some(bundled) = self.bundle_root.as_ref().map(|root| root.join(path)) {
            if bundled.exists() {
                return bundled;
            }
        }
        local
    }
}
