//! `ect init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::config::Config;
use crate::core::store::EntityStore;
use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the config even if .ect/ already exists (data is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let workspace = if args.force {
        Workspace::init_force(&path)
    } else {
        Workspace::init(&path)
    };

    match workspace {
        Ok(workspace) => {
            let config = Config::load(Some(&workspace));
            let db_path = config.database_path(&workspace);
            EntityStore::open(&db_path)?;

            println!(
                "{} Initialized ect workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!("   {}", style(db_path.display()).dim());
            println!();
            println!("Next steps:");
            println!(
                "  {} Register a project",
                style("ect project new <NUMBER> --name <NAME> --client <CLIENT>").yellow()
            );
            println!(
                "  {} Register equipment",
                style("ect equip new <PROJECT> <TAG> --family 3100").yellow()
            );
            println!(
                "  {} Start an inspection",
                style("ect checklist new <PROJECT> <TAG>").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} ect workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("ect init --force").yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
