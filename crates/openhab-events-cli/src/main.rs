//! openhab-events - watch item events from an openHAB hub
//!
//! Subscribes to the hub's SSE event stream and prints each event as JSON.

mod config;
mod output;
mod watch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use openhab_events::ItemEventClient;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ArgOverrides, Config};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "openhab-events")]
#[command(author, version, about = "openHAB item event watcher")]
#[command(propagate_version = true)]
struct Cli {
    /// Hub base URL (e.g. http://openhab.local:8080 or https://myopenhab.org)
    #[arg(short, long, env = "OPENHAB_URL")]
    url: Option<String>,

    /// Username for basic authentication
    #[arg(long, env = "OPENHAB_USERNAME")]
    username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "OPENHAB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "OPENHAB_EVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Only print events
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// All item events
    All,

    /// Item added to the registry
    Added {
        /// Item name
        item: String,
    },

    /// Item removed from the registry
    Removed {
        /// Item name
        item: String,
    },

    /// Item definition updated
    Updated {
        /// Item name
        item: String,
    },

    /// Commands sent to an item
    Command {
        /// Item name
        item: String,
    },

    /// State updates of an item
    State {
        /// Item name
        item: String,
    },

    /// Predicted state of an item
    Predicted {
        /// Item name
        item: String,
    },

    /// State changes of an item
    Changed {
        /// Item name
        item: String,
    },

    /// State changes of a group member
    GroupChanged {
        /// Group item name
        group: String,

        /// Member item name
        member: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(ArgOverrides {
        url: cli.url.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        output: cli.output.map(|f| f.as_str().to_string()),
        no_color: cli.no_color,
    });

    debug!(url = %merged.url, output = %merged.output, "Resolved configuration");

    let format = merged.output_format()?;
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);

    let client = ItemEventClient::new(merged.connection()).context("Failed to create client")?;

    let stream = match &cli.command {
        Commands::All => client.all_events().await,
        Commands::Added { item } => client.item_added(item).await,
        Commands::Removed { item } => client.item_removed(item).await,
        Commands::Updated { item } => client.item_updated(item).await,
        Commands::Command { item } => client.item_command(item).await,
        Commands::State { item } => client.item_state(item).await,
        Commands::Predicted { item } => client.item_state_predicted(item).await,
        Commands::Changed { item } => client.item_state_changed(item).await,
        Commands::GroupChanged { group, member } => {
            client.group_item_state_changed(group, member).await
        }
    }
    .with_context(|| format!("Failed to subscribe to {}", merged.url))?;

    ctx.info(&format!("Subscribed to {}", stream.topic()));
    ctx.info("Press Ctrl+C to stop");

    let running = watch::ctrlc_flag()?;
    let summary = watch::watch(stream, &ctx, running).await?;
    debug!(
        printed = summary.printed,
        malformed = summary.malformed,
        "Watch finished"
    );

    Ok(())
}
