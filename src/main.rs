use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;

/// Relay: partitioned dispatch core for LLM event handlers
#[derive(Parser, Debug)]
#[command(name = "relay", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Path to log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate configuration and report the resolved routing key
    Check {
        /// Path to relay.toml config file
        #[arg(long, default_value = "relay.toml")]
        config: PathBuf,
    },

    /// Stream stdin lines as chunks through a handler, printing delivered
    /// invocations as NDJSON
    Emit {
        /// Path to relay.toml config file
        #[arg(long, default_value = "relay.toml")]
        config: PathBuf,

        /// Connection identifier (defaults to a fresh UUID)
        #[arg(long)]
        connection_id: Option<String>,

        /// Run identifier (defaults to a fresh UUID)
        #[arg(long)]
        run_id: Option<String>,

        /// Thread identifier (defaults to a fresh UUID)
        #[arg(long)]
        thread_id: Option<String>,

        /// Actor recorded as the updater of this run
        #[arg(long, default_value = "relay-cli")]
        updated_by: String,

        /// Chunk payload format (text, xml, json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Optional group suffix appended to the ordering key
        #[arg(long)]
        group_suffix: Option<String>,
    },
}

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(log_level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true);

    let file_layer = log_file.map(|path| {
        let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path.file_name().unwrap_or_default();
        let file_appender = tracing_appender::rolling::never(parent, filename);
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_file)?;

    match cli.command {
        Commands::Check { config } => commands::check::run_check(&config),
        Commands::Emit {
            config,
            connection_id,
            run_id,
            thread_id,
            updated_by,
            format,
            group_suffix,
        } => {
            commands::emit::run_emit(commands::emit::EmitArgs {
                config,
                connection_id,
                run_id,
                thread_id,
                updated_by,
                format,
                group_suffix,
            })
            .await
        }
    }
}
