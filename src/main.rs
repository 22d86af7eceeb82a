use clap::Parser;
use ect::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping to `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let default_level = if global.verbose { "ect=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("ECT_LOG")
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init(args) => ect::cli::commands::init::run(args),
        Commands::Project(cmd) => ect::cli::commands::project::run(cmd, &global),
        Commands::Equip(cmd) => ect::cli::commands::equip::run(cmd, &global),
        Commands::Family(cmd) => ect::cli::commands::family::run(cmd, &global),
        Commands::Checklist(cmd) => ect::cli::commands::checklist::run(cmd, &global),
        Commands::Dashboard(args) => ect::cli::commands::dashboard::run(args, &global),
        Commands::Report(cmd) => ect::cli::commands::report::run(cmd, &global),
        Commands::Completions(args) => ect::cli::commands::completions::run(args),
    }
}
