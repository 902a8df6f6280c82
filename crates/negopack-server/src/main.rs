use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use negopack_core::Store;
use negopack_server::state::AppState;

#[derive(Parser)]
#[command(
    name = "negopack",
    about = "Deal lifecycle API — intake, AI pack generation, review gates, and meeting notes",
    version
)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "NEGOPACK_DB", default_value = "negopack.db")]
    db: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "NEGOPACK_PORT", default_value_t = 8460)]
    port: u16,

    /// API key for the completion provider (pack generation is disabled
    /// when unset)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the completion provider
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    api_base_url: String,

    /// Model used for pack generation
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let store = Arc::new(Store::open(&cli.db)?);

    let ai = match cli.api_key {
        Some(key) => Some(Arc::new(
            negopack_ai::Client::new(cli.api_base_url, key)?.with_model(cli.model),
        )),
        None => {
            tracing::warn!("no provider API key configured; pack generation endpoints will 503");
            None
        }
    };

    let state = AppState::new(store, ai);
    negopack_server::serve(state, &cli.bind, cli.port).await
}
