//! strand-server main binary

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use strand_config::AppConfig;
use strand_engine::WorkspaceEngine;
use strand_foundation::AnalysisEngine;
use strand_session::SessionOrchestrator;

#[derive(Parser)]
#[command(name = "strand-server")]
#[command(about = "Refactoring session server bound to one project directory")]
struct Cli {
    /// The directory containing the project to serve
    project: PathBuf,

    /// Port the server listens on (0 selects an unused port)
    #[arg(short, long, default_value_t = 0)]
    port: u16,

    /// Verbosity level (0 = warnings only, 1 = info, 2 = debug)
    #[arg(short = 'V', long, default_value_t = 0)]
    verbosity: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = AppConfig::from_verbosity(cli.verbosity);
    config.server.port = cli.port;
    let config = Arc::new(config);

    strand_config::logging::initialize(&config);

    // Binding the project or the port is fatal when it fails; everything
    // after that only surfaces errors to clients.
    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Arc<AppConfig>) -> anyhow::Result<()> {
    tracing::info!("Starting strand server");
    tracing::info!(project_root = %cli.project.display(), "Binding project");

    let engine: Arc<dyn AnalysisEngine> = Arc::new(
        WorkspaceEngine::new(&cli.project)
            .with_context(|| format!("cannot open project '{}'", cli.project.display()))?,
    );

    let orchestrator = Arc::new(
        SessionOrchestrator::new(&cli.project, engine, config.history.max_depth)
            .context("failed to initialize the refactoring session")?,
    );

    strand_transport::serve(config, orchestrator)
        .await
        .context("RPC server terminated")?;
    Ok(())
}
