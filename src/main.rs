//! matchday - developer server
//!
//! Loads the team catalog, wires the turn handler and serves the developer
//! routes. Offer search is not part of this binary; resolved pairs are only
//! logged.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use secrecy::ExposeSecret;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matchday::adapters::ai::{
    GeminiConfig, GeminiProvider, OpenAIConfig, OpenAIProvider, RetryPolicy,
};
use matchday::adapters::http::{dev_routes, DevHandlers};
use matchday::adapters::search::LoggingSearchHandoff;
use matchday::adapters::storage::{load_catalog, InMemorySessionStore, SessionLimits};
use matchday::application::handlers::message::{
    HandleMessageHandler, IntentRecognizer, MessageHandlerConfig,
};
use matchday::config::{AiConfig, AiProvider, AppConfig, LogFormat, ServerConfig};
use matchday::ports::{AIError, AIProvider};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "starting matchday"
    );

    let catalog = Arc::new(load_catalog(&config.catalog.path).await?);
    info!(
        teams = catalog.len(),
        path = %config.catalog.path.display(),
        "catalog loaded"
    );

    let provider = build_provider(&config.ai)?;

    let sessions = Arc::new(InMemorySessionStore::new(SessionLimits {
        capacity: config.session.capacity,
        ttl: config.session.ttl(),
        history_limit: config.conversation.history_limit,
    }));
    let _sweeper = sessions.spawn_sweeper(config.session.sweep_interval());

    // Bounds the provider's own retries and backoff as a whole.
    let call_timeout = RetryPolicy::new(config.ai.max_retries).worst_case(config.ai.timeout());
    let recognizer =
        IntentRecognizer::new(provider, catalog.clone()).with_call_timeout(call_timeout);
    let handler = HandleMessageHandler::new(
        sessions.clone(),
        Arc::new(LoggingSearchHandoff::new()),
        catalog.clone(),
        recognizer,
    )
    .with_config(MessageHandlerConfig {
        greeting_cooldown: config.conversation.greeting_cooldown(),
    });

    let app = dev_routes(DevHandlers::new(Arc::new(handler), sessions, catalog))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.log_format() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn build_provider(config: &AiConfig) -> Result<Option<Arc<dyn AIProvider>>, AIError> {
    let Some(key) = config.active_key() else {
        warn!(
            provider = ?config.provider,
            "no AI key configured, running on deterministic matching only"
        );
        return Ok(None);
    };
    let key = key.expose_secret().as_str();

    let provider: Arc<dyn AIProvider> = match config.provider {
        AiProvider::Gemini => {
            let mut gemini = GeminiConfig::new(key)
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries);
            if let Some(model) = &config.model {
                gemini = gemini.with_model(model);
            }
            if let Some(url) = &config.base_url {
                gemini = gemini.with_base_url(url);
            }
            Arc::new(GeminiProvider::new(gemini)?)
        }
        AiProvider::OpenAI => {
            let mut openai = OpenAIConfig::new(key)
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries);
            if let Some(model) = &config.model {
                openai = openai.with_model(model);
            }
            if let Some(url) = &config.base_url {
                openai = openai.with_base_url(url);
            }
            Arc::new(OpenAIProvider::new(openai)?)
        }
    };

    let info = provider.provider_info();
    info!(provider = %info.name, model = %info.model, "AI provider configured");
    Ok(Some(provider))
}
