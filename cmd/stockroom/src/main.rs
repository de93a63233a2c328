//! # Stockroom Binary
//!
//! Loads settings, assembles the adapters behind the service ports and serves
//! the RPC router until Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use ai_adapters::{ChatRanker, ChatRankerConfig, DisabledRanker};
use anyhow::Context;
use api_adapters::{router, AppState};
use auth_adapters::JwtIdentityProvider;
use configs::{DatabaseBackend, DatabaseSettings, LlmSettings, LogFormat, LoggingSettings, Settings};
use domains::ProductRanker;
use secrecy::ExposeSecret;
use services::{Policy, Repositories, Services};
use storage_adapters::MemoryStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.logging);

    // 1. Storage
    let repos = match settings.database.backend {
        DatabaseBackend::Memory => {
            warn!("using the in-memory store; data is lost on restart");
            Repositories::from_store(Arc::new(MemoryStore::new()))
        }
        DatabaseBackend::Postgres => connect_postgres(&settings.database).await?,
    };

    // 2. Identity
    let secret = settings.auth.jwt_secret.as_ref().context("auth.jwt_secret is required")?;
    let identity = JwtIdentityProvider::new(secret.expose_secret(), settings.auth.audience.clone())?;

    // 3. Ranking model
    let ranker = ranker(&settings.llm)?;

    // 4. Services + router
    let policy = Policy {
        enforce_comment_authorship: settings.policy.enforce_comment_authorship,
        enforce_po_transitions: settings.policy.enforce_po_transitions,
    };
    let services = Services::new(repos, Arc::new(identity), ranker, policy);
    let app = router(AppState::new(services));

    let listener = tokio::net::TcpListener::bind(settings.server.bind_addr())
        .await
        .with_context(|| format!("binding {}", settings.server.bind_addr()))?;
    info!(addr = %listener.local_addr()?, "stockroom listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("stockroom stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(feature = "db-postgres")]
async fn connect_postgres(db: &DatabaseSettings) -> anyhow::Result<Repositories> {
    let url = db.url.as_ref().context("database.url is required for the postgres backend")?;
    let store = storage_adapters::PgStore::connect(url.expose_secret(), db.max_connections).await?;
    store.migrate().await?;
    info!(max_connections = db.max_connections, "postgres ready");
    Ok(Repositories::from_store(Arc::new(store)))
}

#[cfg(not(feature = "db-postgres"))]
async fn connect_postgres(_db: &DatabaseSettings) -> anyhow::Result<Repositories> {
    anyhow::bail!("built without db-postgres; set database.backend = \"memory\"")
}

fn ranker(llm: &LlmSettings) -> anyhow::Result<Arc<dyn ProductRanker>> {
    let Some(base_url) = llm.base_url.clone() else {
        info!("llm.base_url not set; semantic search disabled");
        return Ok(Arc::new(DisabledRanker));
    };
    let ranker = ChatRanker::new(ChatRankerConfig {
        base_url,
        api_key: llm.api_key.as_ref().map(|k| k.expose_secret().to_string()),
        model: llm.model.clone(),
        timeout: Duration::from_secs(llm.timeout_secs),
    })?;
    Ok(Arc::new(ranker))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received; draining requests");
}
