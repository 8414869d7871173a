use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use goa_diary::app::AppContext;
use goa_diary::cli::{commands, Cli, Commands};
use goa_diary::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with command output or the TUI
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(&config, cli.db)?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Sources => {
            commands::list_sources(&ctx).await?;
        }
        Commands::Headlines { name, page, share } => {
            commands::show_headlines(&ctx, &name, page, share).await?;
        }
        Commands::Digest => {
            commands::digest(&ctx).await?;
        }
        Commands::Enable { name } => {
            commands::set_source(&ctx, &name, true).await?;
        }
        Commands::Disable { name } => {
            commands::set_source(&ctx, &name, false).await?;
        }
        Commands::Clear => {
            commands::clear_selections(&ctx).await?;
        }
        Commands::Links => {
            commands::print_links(&ctx);
        }
        Commands::Tui => {
            goa_diary::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
    }

    Ok(())
}
