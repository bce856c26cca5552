//! buildcast binary.
//!
//! Publishes build lifecycle events on a ZeroMQ PUB socket, or listens to a
//! running publisher.

use buildcast_core::{
    cli::{handle_listen, handle_publish, Commands},
    logging::{init_logging, LoggingArgs},
};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep the file writer alive until exit
    let _guard = init_logging(&cli.logging)?;

    info!("buildcast starting up");

    match cli.command {
        Commands::Publish(cmd) => handle_publish(cmd).await?,
        Commands::Listen(cmd) => handle_listen(cmd).await?,
    }

    Ok(())
}
