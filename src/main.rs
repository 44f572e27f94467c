use std::sync::Arc;
use std::time::Duration;

use sales_assist::DialogueRouter;
use sales_assist::channels::{chat_routes, serve};
use sales_assist::config::AppConfig;
use sales_assist::error::ChannelError;
use sales_assist::llm::{LlmConfig, Responder, UnavailableResponder, create_responder};
use sales_assist::session::{InMemorySessionStore, SessionStore, spawn_eviction_task};

/// How often the idle-session sweep runs when eviction is enabled.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    run().await?;

    Ok(())
}

async fn run() -> sales_assist::error::Result<()> {
    let config = AppConfig::from_env()?;

    eprintln!("🛒 Sales Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat API: http://0.0.0.0:{}/api/ask", config.port);
    eprintln!("   Health: http://0.0.0.0:{}/health", config.port);

    // ── Generative responder ───────────────────────────────────────────
    let responder: Arc<dyn Responder> = match LlmConfig::from_env() {
        Ok(llm_config) => {
            eprintln!("   Model: {}", llm_config.model);
            create_responder(&llm_config)?
        }
        Err(e) => {
            tracing::warn!("Generative responder disabled: {}", e);
            eprintln!("   Model: none ({})", e);
            Arc::new(UnavailableResponder::new(e.to_string()))
        }
    };

    // ── Sessions ───────────────────────────────────────────────────────
    let sessions: Arc<dyn SessionStore> = InMemorySessionStore::new();
    let _eviction_handle = match config.session_idle_ttl {
        Some(ttl) => {
            eprintln!("   Sessions: evicted after {}s idle", ttl.as_secs());
            Some(spawn_eviction_task(
                Arc::clone(&sessions),
                ttl,
                EVICTION_INTERVAL,
            ))
        }
        None => {
            eprintln!("   Sessions: kept for process lifetime");
            None
        }
    };

    let router = Arc::new(DialogueRouter::new(
        config.router.clone(),
        sessions,
        responder,
    ));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|e| ChannelError::StartupFailed {
            name: "http".to_string(),
            reason: format!("Failed to bind port {}: {}", config.port, e),
        })?;
    tracing::info!(port = config.port, "Chat server started");
    eprintln!();

    serve(listener, chat_routes(router), async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Ctrl+C received, shutting down..."),
            Err(e) => {
                tracing::warn!("Could not listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
    .await?;

    Ok(())
}
