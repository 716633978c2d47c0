use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod loader;
mod output;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("weave error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();

    if let cli::Commands::Schema(args) = &cli.command {
        init_tracing(flags.quiet, flags.verbose, "warn")?;
        ui::init(&flags);
        return commands::schema::handle(args, &flags);
    }

    let config = bootstrap::load_config(&flags)?;
    init_tracing(flags.quiet, flags.verbose, &config.log.level)?;
    ui::init(&flags);

    commands::dispatch::dispatch(cli.command, &config, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool, configured: &str) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        configured
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("WEAVE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
