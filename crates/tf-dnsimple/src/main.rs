//! Command-line entry point for **tf-dnsimple**
//!
//! * Parses `--config` (or `DNSIMPLE_PROVIDER_CONFIG`) and a subcommand
//! * Sets up tracing on stderr; stdout carries only the handshake line
//! * `serve` boots the plugin server, `schema` prints the provider schema

use anyhow::Result;
use clap::{Parser, Subcommand};
use tf_dnsimple_core::{bootstrap, load_config, provider::DnsimpleProvider};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the config file (optional; environment variables are used if absent)
    #[arg(short, long, env = "DNSIMPLE_PROVIDER_CONFIG", default_value = "tf-dnsimple.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the plugin server (default)
    Serve,
    /// Print provider and resource schemas as JSON
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("DNSIMPLE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("info,axum::rejection=warn")),
        )
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    let cfg = load_config(&cli.config)?;
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bootstrap(cfg).await,
        Command::Schema => {
            let provider = DnsimpleProvider::new(cfg.provider);
            let out = serde_json::to_string_pretty(&provider.schema())?;
            #[allow(clippy::print_stdout)]
            {
                println!("{out}");
            }
            Ok(())
        }
    }
}
