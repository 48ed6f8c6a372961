// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall - channel-scoped semantic memory for chat messages.
//!
//! This is the binary entry point: the gateway server plus small client
//! commands for a running gateway.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use recall_config::RecallConfig;
use recall_core::{Message, RecallError, Scalar};
use recall_gateway::GatewayClient;

/// Recall - channel-scoped semantic memory for chat messages.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the memory gateway.
    Serve,
    /// Store a message through a running gateway.
    Add {
        /// Channel id, e.g. `guild/thread`.
        #[arg(long)]
        channel: String,
        /// Message id. Re-adding an id is a no-op.
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "cli")]
        author: String,
        /// Sequence number within the channel.
        #[arg(long, default_value_t = 0)]
        sequence: i64,
        /// Gateway base URL (defaults to the configured server address).
        #[arg(long)]
        url: Option<String>,
        /// Message text.
        content: String,
    },
    /// Search a channel through a running gateway.
    Query {
        #[arg(long)]
        channel: String,
        /// Maximum number of messages (server default when omitted).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        url: Option<String>,
        /// Search text.
        query: String,
    },
    /// Print the collection name a channel id maps to.
    Collection {
        channel: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => recall_config::load_and_validate_path(path),
        None => recall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            recall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: RecallConfig) -> Result<(), RecallError> {
    match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Add {
            channel,
            id,
            author,
            sequence,
            url,
            content,
        } => {
            let client = client(url, &config)?;
            let message = Message {
                id,
                author,
                content,
                timestamp: Scalar::Int(chrono::Utc::now().timestamp_millis()),
                channel_id: channel,
                sequence: Scalar::Int(sequence),
            };
            client.add(&message).await?;
            println!("ok");
            Ok(())
        }
        Commands::Query {
            channel,
            limit,
            url,
            query,
        } => {
            let client = client(url, &config)?;
            let messages = client.query(&channel, &query, limit).await?;
            let json = serde_json::to_string_pretty(&messages)
                .map_err(|e| RecallError::Internal(format!("failed to render messages: {e}")))?;
            println!("{json}");
            Ok(())
        }
        Commands::Collection { channel } => {
            println!("{}", recall_memory::collection_name(&channel));
            Ok(())
        }
    }
}

fn client(url: Option<String>, config: &RecallConfig) -> Result<GatewayClient, RecallError> {
    let url = url.unwrap_or_else(|| config.server.base_url());
    GatewayClient::new(&url)
}
