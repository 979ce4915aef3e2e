use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recruit_match::config::Config;
use recruit_match::llm_client::LlmClient;
use recruit_match::matching::analysis::LlmMatchScorer;
use recruit_match::matching::taxonomy::Taxonomy;
use recruit_match::matching::{ImprovementAdvisor, MatchEngine};
use recruit_match::routes::build_router;
use recruit_match::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recruit-match v{}", env!("CARGO_PKG_VERSION"));

    // Deterministic scorer is always available
    let mut engine = MatchEngine::new(Arc::new(Taxonomy::default()));

    // External scorer only with credentials
    match config.llm_settings() {
        Some(settings) => {
            let llm = Arc::new(LlmClient::new(settings)?);
            info!(
                "LLM client initialized (model: {}, {}ms per attempt)",
                llm.model(),
                config.attempt_timeout().as_millis()
            );
            engine = engine
                .with_external(Arc::new(LlmMatchScorer::new(
                    llm.clone(),
                    config.llm_timeout,
                )))
                .with_advisor(Arc::new(ImprovementAdvisor::new(llm, config.llm_timeout)));
        }
        None => warn!(
            "LLM_API_KEY is not set; the external strategy and suggestions are disabled"
        ),
    }

    let state = AppState::new(&config, engine);
    info!(
        "Batch policy: {} per group, {}ms between groups",
        state.batch_policy.batch_size,
        state.batch_policy.batch_delay.as_millis()
    );

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
