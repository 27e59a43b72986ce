//! Live scorer binary entrypoint wiring REST, SSE, and the document store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use live_scorer_back::{
    config::AppConfig,
    dao::document_store::{DocumentStore, memory::MemoryDocumentStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());

    let default_backend = if cfg!(feature = "couch-store") { "couch" } else { "memory" };
    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| default_backend.into());
    match backend.as_str() {
        "memory" => {
            warn!("using the in-memory document store; data is lost on restart");
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
            app_state.set_document_store(store).await;
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            tokio::spawn(run_couch_supervisor(app_state.clone()));
        }
        other => bail!("unsupported STORE_BACKEND `{other}`"),
    }

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, backend = %backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Connect to CouchDB in the background, reconnecting and toggling degraded
/// mode as connectivity changes.
#[cfg(feature = "couch-store")]
async fn run_couch_supervisor(state: SharedState) {
    use live_scorer_back::{
        dao::{
            document_store::couchdb::{CouchConfig, CouchDocumentStore},
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    storage_supervisor::run(state, || async {
        let config = CouchConfig::from_env()?;
        let store = CouchDocumentStore::connect(config).await?;
        let store: Arc<dyn DocumentStore> = Arc::new(store);
        Ok::<_, StorageError>(store)
    })
    .await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "could not install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
