use axum::Router;
use std::{panic, process, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::flow::UnmountedFlow;
use crate::config::Config;
use crate::error::AppError;
use crate::services::discovery::HttpDiscovery;
use crate::services::host::{Host, HostOptions};
use crate::services::provider::Bootstrapper;
use crate::services::store::FsStore;
use crate::services::trust::TrustVerifier;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost.
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, keep the server running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting provider in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|_| AppError::Internal)?;
    axum::serve(listener, app)
        .await
        .map_err(|_| AppError::Internal)?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState, AppError> {
    // The keychain bootstrap must finish before any request is served: the
    // authority's signing identity is process-wide state.
    let store = FsStore::new(&config.storage_root);
    let bootstrapper = Bootstrapper::new(
        store,
        config.issuer.clone(),
        config.callback_uri.clone(),
        config.post_logout_redirect_uri.clone(),
    );
    let provider = bootstrapper.bootstrap().await.map_err(|e| {
        tracing::error!(error = %e, "authority bootstrap failed");
        AppError::from(e)
    })?;

    let discovery = HttpDiscovery::new(config.discovery_timeout).map_err(|e| {
        tracing::error!(error = %e, "discovery client construction failed");
        AppError::Internal
    })?;
    let verifier = Arc::new(TrustVerifier::new(config.issuer.clone(), discovery));

    let host = Arc::new(Host::new(
        config.post_logout_redirect_uri.clone(),
        HostOptions::default(),
    ));

    Ok(AppState::new(
        host,
        verifier,
        Arc::new(provider),
        Arc::new(UnmountedFlow),
    ))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
