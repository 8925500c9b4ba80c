mod doctor_cmd;
mod render_cmd;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use stylescout_config::{CliOverrides, PreparedConfig, load_and_prepare};
use stylescout_gateway::{GatewayState, start_server};
use stylescout_logging::init_logger;

use render_cmd::OutputFormat;

#[derive(Parser)]
#[command(name = "stylescout")]
#[command(about = "StyleScout: design inspiration from an app idea")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the StyleScout HTTP gateway
    Serve {
        /// Config file (defaults to ~/.stylescout/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Render a markdown file (or stdin) with color swatches
    Render {
        /// Markdown file; reads stdin when omitted
        file: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },
    /// Check the configuration without starting the server
    Doctor {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port } => {
            let prepared = load_and_prepare(config.as_deref(), &CliOverrides { port }).await?;
            run_server(prepared).await?;
        }
        Commands::Render { file, format } => {
            let markdown = render_cmd::read_input(file.as_deref()).await?;
            print!("{}", render_cmd::render(&markdown, format)?);
        }
        Commands::Doctor { config } => {
            let healthy = doctor_cmd::run(config.as_deref()).await?;
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_server(prepared: PreparedConfig) -> Result<()> {
    let PreparedConfig { config, warnings } = prepared;
    init_logger(config.logging.level(), config.logging.dir.as_deref().map(Path::new));
    for warning in &warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind(), config.server.port())
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind()))?;

    info!(
        port = config.server.port(),
        bind = %config.server.bind(),
        text_model = %config.openai.model(),
        vision_model = %config.gemini.model(),
        "Starting StyleScout gateway"
    );

    let state = GatewayState::from_config(&config)?;
    start_server(addr, state).await
}
