use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ytcreator_chain::{Pipeline, WikipediaClient};
use ytcreator_llm::{ClientFactory, ProviderConfig};
use ytcreator_web::{build_router, config::Config, credentials::Credentials, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting ytcreator");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let credentials = Credentials::load(&config.credentials.path)
        .map_err(|e| anyhow::anyhow!("Failed to load credentials: {}", e))?;

    tracing::info!(model = %config.llm.model, "Initializing LLM client");
    let mut openai = credentials.openai_config();
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let client = ClientFactory::create_chat_client(ProviderConfig::openai(openai))?;

    tracing::info!(endpoint = %config.wikipedia.api_url(), "Initializing Wikipedia lookup");
    let wikipedia = WikipediaClient::new(config.wikipedia.clone())?;

    let pipeline = Pipeline::new(client, Arc::new(wikipedia), (&config.llm).into())?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(config, pipeline));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
