use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, debug, info};
use tokio::net::TcpListener;

use caster::openai::OpenAiClient;
use caster::relay::{ChatHub, ChatSession};
use caster::server::{self, AppState};
use caster::settings::Settings;

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let settings = Settings::load(cli.config.as_deref())?;
    debug!(
        "using model {} via {}",
        settings.openai.model, settings.openai.endpoint
    );

    match cli.command {
        Command::Serve(cmd) => run_serve(settings, cmd),
    }
}

#[tokio::main]
async fn run_serve(settings: Settings, cmd: ServeCommand) -> Result<()> {
    serve(settings, cmd).await
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Caster - LLM chat relay with live viewer broadcast.",
    propagate_version = true
)]
struct Cli {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the relay server
    Serve(ServeCommand),
}

#[derive(Debug, Args)]
struct ServeCommand {
    /// Override the bind address
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

async fn serve(settings: Settings, cmd: ServeCommand) -> Result<()> {
    if settings.openai.api_key.is_empty() {
        anyhow::bail!("no API key configured; set CASTER_OPENAI__API_KEY or OPENAI_API_KEY");
    }

    let client = OpenAiClient::new(settings.openai.client_config());
    let (hub, router) = ChatHub::new();
    let session = Arc::new(ChatSession::new(
        client,
        hub.clone(),
        settings.openai.system_prompt.as_deref(),
    ));

    // The router must outlive every subscriber; it is supervised here and an
    // early exit takes the process down instead of silently dying.
    let mut router_task = tokio::spawn(router.run());

    let state = AppState::new(session, hub, settings.openai.stream);
    let app = server::create_router(state);

    let bind = cmd.bind.unwrap_or(settings.server.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    tokio::select! {
        result = async { axum::serve(listener, app).await } => {
            result.context("server error")?;
        }
        result = &mut router_task => {
            result.context("broadcast router panicked")?;
            anyhow::bail!("broadcast router exited unexpectedly");
        }
    }
    Ok(())
}
