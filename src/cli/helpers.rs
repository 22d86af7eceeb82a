//! Shared helper functions for CLI commands
//!
//! Workspace/store opening and small formatting utilities used across the
//! command modules.

use clap::ValueEnum;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::store::EntityStore;
use crate::core::workspace::Workspace;

/// Everything a command needs: the workspace, its config and an open store
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub store: EntityStore,
}

impl Session {
    /// Discover the workspace (or use `--workspace`), load config, open the database
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = match &global.workspace {
            Some(dir) => Workspace::discover_from(dir)?,
            None => Workspace::discover()?,
        };
        let config = Config::load(Some(&workspace));
        let db_path = config.database_path(&workspace);
        tracing::debug!(db = %db_path.display(), "opening store");
        let store = EntityStore::open(&db_path)?;
        Ok(Self {
            workspace,
            config,
            store,
        })
    }

    /// Output format after applying `default_format` from config
    pub fn format(&self, global: &GlobalOpts, auto: OutputFormat) -> OutputFormat {
        resolve_format(global.format, self.config.default_format.as_deref(), auto)
    }
}

/// Resolve `Auto` against the configured default, then the command's default
pub fn resolve_format(
    requested: OutputFormat,
    configured: Option<&str>,
    auto: OutputFormat,
) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    match configured.and_then(|s| OutputFormat::from_str(s, true).ok()) {
        Some(OutputFormat::Auto) | None => auto,
        Some(format) => format,
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Local date/time for list output
pub fn format_datetime(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("válvula esférica", 8), "válvu...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            resolve_format(OutputFormat::Json, Some("yaml"), OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, Some("md"), OutputFormat::Tsv),
            OutputFormat::Md
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, Some("bogus"), OutputFormat::Tsv),
            OutputFormat::Tsv
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, None, OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }
}
