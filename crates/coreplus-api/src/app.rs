//! Application builder: wires registries, routes and middleware into an
//! Axum app, and runs the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use coreplus_core::config::AppConfig;
use coreplus_core::configs::CoreplusSettings;
use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::routing::Route;
use coreplus_hooks::{AppRegistry, HookDirectory, HookDispatcher, InstalledApp};
use coreplus_settings::SettingsRegistry;

use crate::admin::AdminSite;
use crate::handlers::health::health;
use crate::helpers::build_api_routes;
use crate::middleware::auth::remote_user;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::schema;
use crate::state::AppState;

/// Capacity of the setting-changed channel.
const SETTING_CHANGED_CAPACITY: usize = 16;

/// Builds every registry from configuration and the compiled-in app
/// catalog.
///
/// Setting types declared by the installed apps are registered here. Hook
/// discovery has not run yet when this returns.
pub async fn build_state(
    config: AppConfig,
    catalog: Vec<Arc<dyn InstalledApp>>,
) -> AppResult<AppState> {
    let settings = Arc::new(CoreplusSettings::new(config.coreplus.clone()));
    schema::register_default(settings.imports());

    let apps = Arc::new(AppRegistry::from_installed(
        catalog,
        &config.hooks.installed_apps,
    )?);
    let hooks = Arc::new(HookDirectory::new(
        Arc::clone(&apps),
        &settings.hook_file_name()?,
    ));

    let admin_prefix = config.admin.url_prefix.trim_start_matches('/');
    let settings_registry = Arc::new(SettingsRegistry::new(
        Arc::clone(&hooks),
        Arc::clone(&apps),
        &format!("/{admin_prefix}settings/"),
    ));
    settings_registry.register_installed().await?;

    let admin = Arc::new(AdminSite::new(
        HookDispatcher::new(Arc::clone(&hooks)),
        Arc::clone(&apps),
        Arc::clone(&settings),
        Arc::clone(&settings_registry),
        config.admin.clone(),
    ));

    let (setting_changed, rx) = broadcast::channel(SETTING_CHANGED_CAPACITY);
    Arc::clone(&settings).spawn_change_listener(rx);

    info!(
        apps = apps.len(),
        hook_module = %hooks.module_name(),
        "Application state built"
    );

    Ok(AppState {
        config: Arc::new(config),
        settings,
        apps,
        hooks,
        settings_registry,
        admin,
        setting_changed,
        started_at: Utc::now(),
    })
}

/// Builds the complete Axum application.
///
/// Runs hook discovery first, so a broken hook module fails here instead
/// of on the first request. Route assembly errors abort as well.
pub async fn build_app(state: &AppState) -> AppResult<Router> {
    state.hooks.ensure_loaded().await?;

    let dispatcher = HookDispatcher::new(Arc::clone(&state.hooks));
    let mut table = build_api_routes(&dispatcher, &state.settings, &state.config.api).await?;

    let admin_prefix = state.config.admin.url_prefix.trim_start_matches('/');
    table.include(admin_prefix, state.admin.get_urls().await?)?;

    let started_at = state.started_at;
    table.push(Route::new("health", get(move || health(started_at))).named("health"));

    info!(routes = table.len(), "Routes assembled");

    let auth = Arc::new(state.config.auth.clone());
    Ok(table
        .into_router()?
        .layer(from_fn_with_state(auth, remote_user))
        .layer(from_fn(request_logging))
        .layer(build_cors_layer(&state.config.server.cors))
        .layer(TraceLayer::new_for_http()))
}

/// Binds and serves until ctrl-c, then drains connections for at most the
/// configured grace period.
pub async fn run_server(state: AppState) -> AppResult<()> {
    let app = build_app(&state).await?;

    let server = &state.config.server;
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "Coreplus server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let grace = Duration::from_secs(server.shutdown_grace_seconds);
    let deadline = async move {
        if shutdown_rx.wait_for(|stopping| *stopping).await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = serve => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = deadline => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    info!("Coreplus server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
