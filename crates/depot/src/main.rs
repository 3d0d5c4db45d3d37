use std::process;

use tracing_subscriber::EnvFilter;

use depot::orchestrator::{self, OrchestratorConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = depot::DEPOT_VERSION, "depot starting");

    let summary = match orchestrator::run(OrchestratorConfig::new()).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize summary: {e}"),
    }

    tracing::info!("depot shut down");
}
