use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use tl_cli::commands::{add, export, report, sent, tasks, totals, undo};
use tl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        // Warnings (e.g. a report that was already sent) show without RUST_LOG
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let now = Local::now().naive_local();

    match command {
        Commands::Add { text } => add::run(&config, text, now)?,
        Commands::Undo => undo::run(&config, now)?,
        Commands::Report(args) => report::run(&config, args, now)?,
        Commands::Totals(args) => totals::run(&config, args, now)?,
        Commands::Export { format } => export::run(&config, *format, Utc::now())?,
        Commands::Tasks => tasks::run(&config)?,
        Commands::Sent { kind, date } => sent::run(&config, kind, date.as_deref(), now)?,
    }

    Ok(())
}
