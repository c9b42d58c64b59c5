use clap::Parser;
use std::path::PathBuf;
use taskboard_server::{serve, AppState, ConfigOverrides, ServerConfig, StorageKind};

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Task board backend with real-time change notification")]
#[command(long_about = "
Serves a per-user kanban board over HTTP. Every committed change is
announced to WebSocket clients on /ws with a `task-updated` frame.

Configuration is read from taskboard.{toml,yaml,json} in the working
directory, then TASKBOARD_* environment variables (and PORT), then flags.

Example:
  taskboard                             # Serve on 0.0.0.0:5000 from ./.taskboard
  taskboard --port 8080 --storage memory
  RUST_LOG=taskboard_kanban=debug taskboard
")]
struct Cli {
    /// Explicit configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the file store
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum)]
    storage: Option<StorageKind>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            data_dir: self.data_dir.clone(),
            storage: self.storage,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref(), &cli.overrides())?;

    configure_logging(&cli, &config);
    tracing::debug!(?config, "starting");

    let state = AppState::from_config(&config).await?;
    serve(state, &config).await
}

fn configure_logging(cli: &Cli, config: &ServerConfig) {
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let log_level = if cli.quiet {
        "error"
    } else if cli.debug {
        "debug"
    } else if cli.verbose {
        "trace"
    } else {
        config.log_level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hyper=warn,{log_level}")));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
