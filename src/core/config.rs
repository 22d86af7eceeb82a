//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::workspace::Workspace;

/// ect configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path (relative paths resolve against the workspace root)
    pub database: Option<PathBuf>,

    /// Directory for generated reports
    pub report_dir: Option<PathBuf>,

    /// Inspector name printed on reports
    pub inspector: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/ect/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Workspace config (.ect/config.yaml)
        if let Some(ws) = workspace {
            if let Some(local) = Self::read_file(&ws.config_path()) {
                config.merge(local);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        let only_comments = contents.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        });
        if only_comments {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ect")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Environment overrides: ECT_DATABASE, ECT_REPORT_DIR, ECT_INSPECTOR
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(db) = non_empty("ECT_DATABASE") {
            self.database = Some(PathBuf::from(db));
        }
        if let Some(dir) = non_empty("ECT_REPORT_DIR") {
            self.report_dir = Some(PathBuf::from(dir));
        }
        if let Some(name) = non_empty("ECT_INSPECTOR") {
            self.inspector = Some(name);
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.report_dir.is_some() {
            self.report_dir = other.report_dir;
        }
        if other.inspector.is_some() {
            self.inspector = other.inspector;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Database path for a workspace
    pub fn database_path(&self, workspace: &Workspace) -> PathBuf {
        match &self.database {
            Some(path) => workspace.resolve(path),
            None => workspace.default_database_path(),
        }
    }

    /// Report directory for a workspace
    pub fn report_dir(&self, workspace: &Workspace) -> PathBuf {
        match &self.report_dir {
            Some(path) => workspace.resolve(path),
            None => workspace.default_report_dir(),
        }
    }

    /// Inspector name, falling back to the login user
    pub fn inspector(&self) -> Option<String> {
        self.inspector
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            database: Some(PathBuf::from("a.db")),
            inspector: Some("Ana".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            database: Some(PathBuf::from("b.db")),
            ..Default::default()
        });
        assert_eq!(base.database, Some(PathBuf::from("b.db")));
        assert_eq!(base.inspector.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ECT_DATABASE", "/tmp/other.db"),
            ("ECT_INSPECTOR", "Bruno"),
            ("ECT_REPORT_DIR", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            report_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.database, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.inspector.as_deref(), Some("Bruno"));
        assert_eq!(config.report_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_workspace_config_and_paths() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        std::fs::write(
            ws.config_path(),
            "database: data/inspections.db\nreport_dir: out\n",
        )
        .unwrap();

        let local = Config::read_file(&ws.config_path()).unwrap();
        assert_eq!(local.database_path(&ws), ws.root().join("data/inspections.db"));
        assert_eq!(local.report_dir(&ws), ws.root().join("out"));

        let defaults = Config::default();
        assert_eq!(defaults.database_path(&ws), ws.ect_dir().join("checklists.db"));
        assert_eq!(defaults.report_dir(&ws), ws.root().join("reports"));
    }

    #[test]
    fn test_commented_default_config_has_no_overrides() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        assert!(Config::read_file(&ws.config_path()).is_none());
    }
}
