use anyhow::Context;
use clap::Parser;
use rusty_students::{
    api::{self, AppState},
    config, logging,
    store::StudentStore,
    summary::OllamaSummaryClient,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "rusty-students",
    about = "In-memory student records service with LLM summaries"
)]
struct Cli {
    /// Port to listen on (overrides SERVER_PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();
    config::init_config(cli.port).context("Failed to load config from environment")?;
    let config = config::get_config();

    let summarizer = OllamaSummaryClient::from_config(config)
        .context("Failed to construct Ollama client")?;
    let state = AppState::new(Arc::new(StudentStore::new()), Arc::new(summarizer));
    let app = api::create_router(state);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!(
        ollama_url = %config.ollama_url,
        model = %config.ollama_model,
        "Listening on http://0.0.0.0:{}",
        config.server_port
    );
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
