//! Thin local façade over the Orchestrator, exercising the four operations
//! spec §6 requires: `getValuation`, `refreshValuation`, `getAnalysis`,
//! `refreshAnalysis`. Bootstrap mirrors the teacher's `apps/api/src/main.rs`
//! tracing init, swapped for a one-shot command instead of an HTTP server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use valuation_core::{Config, HttpLlmClient, LlmClient, Orchestrator};

#[derive(Parser)]
#[command(name = "valuation", about = "Hybrid Valuation Core CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cached (or freshly computed) valuation for a ticker.
    Valuation {
        ticker: String,
        #[arg(long)]
        refresh: bool,
    },
    /// Print the cached (or freshly computed) investment memo for a ticker.
    Analysis {
        ticker: String,
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valuation_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!("starting valuation CLI against cache at {}", config.cache_dir);

    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::new(
        "https://api.openai.com/v1",
        config.llm_api_key.clone(),
        config.llm_model_name.clone(),
    ));
    let orchestrator = Orchestrator::connect(&config, llm).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let cli = Cli::parse();
    match cli.command {
        Command::Valuation { ticker, refresh } => {
            let result = if refresh {
                orchestrator.refresh_valuation(&ticker).await
            } else {
                orchestrator.get_valuation(&ticker).await
            }
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Analysis { ticker, refresh } => {
            let memo = if refresh {
                orchestrator.refresh_analysis(&ticker).await
            } else {
                orchestrator.get_analysis(&ticker).await
            }
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            println!("{}", serde_json::to_string_pretty(&memo)?);
        }
    }

    Ok(())
}
