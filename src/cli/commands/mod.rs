use crate::config::ConfigArgs;
use crate::constants::defaults;
use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    /// Publish build lifecycle events read as JSON lines from stdin
    Publish(PublishCommand),
    /// Subscribe to a publisher and print every event received
    Listen(ListenCommand),
}

#[derive(Debug, Args)]
pub struct PublishCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// How long to wait for queued events after stdin closes (milliseconds)
    #[arg(long, default_value_t = 500)]
    pub drain_ms: u64,
}

#[derive(Debug, Args)]
pub struct ListenCommand {
    /// Publisher host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Publisher port
    #[arg(short, long, default_value_t = defaults::PORT)]
    pub port: u16,

    /// Only print events starting with this prefix (e.g. `onCompleted`)
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Exit after receiving this many events
    #[arg(long)]
    pub count: Option<usize>,
}
