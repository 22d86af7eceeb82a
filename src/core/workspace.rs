//! Workspace discovery and layout
//!
//! A workspace is any directory holding an `.ect/` folder. The folder keeps
//! the workspace config and, by default, the SQLite database.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Name of the workspace marker directory
pub const ECT_DIR: &str = ".ect";

/// Default database file inside `.ect/`
pub const DEFAULT_DATABASE: &str = "checklists.db";

/// Default report directory, relative to the workspace root
pub const DEFAULT_REPORT_DIR: &str = "reports";

#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `.ect/`
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace by walking up from `start`
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(format!("{}: {}", start.display(), e)))?;

        loop {
            if current.join(ECT_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found workspace");
                return Ok(Self { root: current });
            }
            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.ect/` with a commented default config
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(ECT_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }
        Self::write_layout(root)
    }

    /// Initialize even if `.ect/` exists; the database is left untouched
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_layout(root)
    }

    fn write_layout(root: PathBuf) -> Result<Self, WorkspaceError> {
        let ect_dir = root.join(ECT_DIR);
        std::fs::create_dir_all(&ect_dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(ect_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        tracing::info!(root = %root.display(), "initialized workspace");
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Equipment Checklist Toolkit workspace configuration

# SQLite database, relative to the workspace root
# database: .ect/checklists.db

# Where `ect report checklist` writes files
# report_dir: reports

# Inspector name printed on reports
# inspector: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ect_dir(&self) -> PathBuf {
        self.root.join(ECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.ect_dir().join("config.yaml")
    }

    /// Resolve a configured path against the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn default_database_path(&self) -> PathBuf {
        self.ect_dir().join(DEFAULT_DATABASE)
    }

    pub fn default_report_dir(&self) -> PathBuf {
        self.root.join(DEFAULT_REPORT_DIR)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum WorkspaceError {
    #[error("not an ect workspace (searched from {searched_from:?})")]
    #[diagnostic(
        code(ect::workspace::not_found),
        help("Run 'ect init' to create one, or pass --workspace <DIR>")
    )]
    NotFound { searched_from: PathBuf },

    #[error("ect workspace already exists at {0:?}")]
    #[diagnostic(code(ect::workspace::exists), help("Use 'ect init --force' to rewrite the config"))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(ect::workspace::io))]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.ect_dir().is_dir());
        assert!(ws.config_path().exists());
        assert_eq!(ws.default_database_path(), ws.ect_dir().join("checklists.db"));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let nested = tmp.path().join("site/area-2");
        std::fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::discover_from(&nested).unwrap();
        assert_eq!(ws.root().to_path_buf(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_without_workspace() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert_eq!(ws.resolve(Path::new("out")), ws.root().join("out"));
        let abs = tmp.path().join("abs.db");
        assert_eq!(ws.resolve(&abs), abs);
    }
}
