//! `ect dashboard` command - Workspace overview

use console::style;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dashboard::Dashboard;

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {}

pub fn run(_args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let dashboard = Dashboard::collect(&session.store)?;

    match session.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&dashboard).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&dashboard).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Md => print!("{}", render_markdown(&dashboard)),
        OutputFormat::Csv => {
            println!("project,open,completed,action_plans");
            for name in project_names(&dashboard) {
                let (open, done, plans) = counts(&dashboard, name);
                println!(
                    "{},{},{},{}",
                    crate::cli::helpers::escape_csv(name),
                    open,
                    done,
                    plans
                );
            }
        }
        _ => print_human(&dashboard, global.quiet),
    }
    Ok(())
}

/// Every project name appearing in any counter
fn project_names(dashboard: &Dashboard) -> BTreeSet<&str> {
    dashboard
        .open_per_project
        .keys()
        .chain(dashboard.completed_per_project.keys())
        .chain(dashboard.action_plans_per_project.keys())
        .map(String::as_str)
        .collect()
}

fn counts(dashboard: &Dashboard, name: &str) -> (i64, i64, i64) {
    let get = |map: &std::collections::BTreeMap<String, i64>| map.get(name).copied().unwrap_or(0);
    (
        get(&dashboard.open_per_project),
        get(&dashboard.completed_per_project),
        get(&dashboard.action_plans_per_project),
    )
}

fn render_markdown(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    output.push_str("# Inspection Dashboard\n\n");

    let mut totals = Builder::default();
    totals.push_record(["Metric", "Count"]);
    totals.push_record(["Projects", &dashboard.projects.to_string()]);
    totals.push_record(["Equipment", &dashboard.equipment.to_string()]);
    totals.push_record(["Checklists", &dashboard.checklists.to_string()]);
    totals.push_record(["Open", &dashboard.open_total().to_string()]);
    totals.push_record(["Completed", &dashboard.completed_total().to_string()]);
    totals.push_record(["Action plans", &dashboard.action_plan_total().to_string()]);
    output.push_str(&totals.build().with(Style::markdown()).to_string());

    let names = project_names(dashboard);
    if !names.is_empty() {
        output.push_str("\n\n## Per Project\n\n");
        let mut per_project = Builder::default();
        per_project.push_record(["Project", "Open", "Completed", "Action plans"]);
        for name in names {
            let (open, done, plans) = counts(dashboard, name);
            per_project.push_record([
                name.to_string(),
                open.to_string(),
                done.to_string(),
                plans.to_string(),
            ]);
        }
        output.push_str(&per_project.build().with(Style::markdown()).to_string());
    }
    output.push('\n');
    output
}

fn print_human(dashboard: &Dashboard, quiet: bool) {
    if !quiet {
        println!("{}", style("Inspection Dashboard").bold().underlined());
        println!();
    }
    println!(
        "  Projects: {}   Equipment: {}   Checklists: {}",
        style(dashboard.projects).cyan(),
        style(dashboard.equipment).cyan(),
        style(dashboard.checklists).cyan()
    );
    println!(
        "  Open: {}   Completed: {}   Action plans: {}",
        style(dashboard.open_total()).yellow(),
        style(dashboard.completed_total()).green(),
        style(dashboard.action_plan_total()).red()
    );

    let names = project_names(dashboard);
    if names.is_empty() {
        return;
    }
    println!();
    println!(
        "  {:<32} {:>6} {:>10} {:>13}",
        style("PROJECT").bold(),
        style("OPEN").bold(),
        style("COMPLETED").bold(),
        style("ACTION PLANS").bold()
    );
    for name in names {
        let (open, done, plans) = counts(dashboard, name);
        println!("  {:<32} {:>6} {:>10} {:>13}", name, open, done, plans);
    }
}
