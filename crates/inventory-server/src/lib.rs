//! Inventory Server
//!
//! HTTP shell around a single inventory view session. The server owns the
//! process-wide store and identity clients and forwards each request to the
//! controller as one discrete action.

pub mod auth;
pub mod http;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use inventory_core::config::ConfigError;
use inventory_core::{
    DocumentStore, InventoryConfig, InventoryController, InventoryError, InventoryStore,
    LocalIdentityProvider, MemoryDocumentStore, StoreBackend,
};

/// Shared application state
pub struct AppState {
    pub controller: Mutex<InventoryController>,
    pub identity: Arc<LocalIdentityProvider>,
    pub config: InventoryConfig,
}

impl AppState {
    /// Build the session over an already opened store and mount it.
    pub fn new(store: Arc<dyn DocumentStore>, config: InventoryConfig) -> Result<Self, InventoryError> {
        let identity = Arc::new(LocalIdentityProvider::new(config.identity.to_identity()));
        let inventory = InventoryStore::with_collection(store, config.store.collection.clone());
        let mut controller = InventoryController::new(inventory, identity.clone());
        controller.mount()?;

        Ok(Self {
            controller: Mutex::new(controller),
            identity,
            config,
        })
    }

    /// Open the configured store backend and build the session.
    pub fn from_config(config: InventoryConfig) -> Result<Self, InventoryError> {
        let store = open_store(&config)?;
        Self::new(store, config)
    }

    /// Release the identity subscription.
    pub async fn shutdown(&self) {
        self.controller.lock().await.unmount();
    }
}

/// Open the document store named by the config.
pub fn open_store(config: &InventoryConfig) -> Result<Arc<dyn DocumentStore>, InventoryError> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => {
            let path = config
                .sqlite_path()
                .ok_or_else(|| ConfigError::MissingField("store.path".to_string()))?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", parent.display(), e)))?;
            }
            tracing::info!("Opening sqlite store at {:?}", path);
            Ok(Arc::new(inventory_core::SqliteDocumentStore::open(&path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => Err(ConfigError::Invalid(
            "sqlite backend requires the `sqlite` feature".to_string(),
        )
        .into()),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let items = Router::new()
        .route("/items", get(http::list_items))
        .route("/items/{name}", get(http::get_item))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        // Session endpoints
        .route("/session", get(http::get_session))
        .route("/session/sign-in", post(http::sign_in))
        .route("/session/sign-in-as", post(http::sign_in_as))
        .route("/session/sign-out", post(http::sign_out))
        .route("/session/refresh", post(http::refresh))
        .route("/session/search", put(http::set_search))
        // Modal endpoints
        .route("/session/modal/add", post(http::open_add))
        .route("/session/modal/view/{name}", post(http::view_item))
        .route("/session/modal/close", post(http::close_modal))
        .route("/session/form", put(http::update_form))
        .route("/session/form/submit", post(http::submit_form))
        // Item actions
        .route("/session/items/{name}/remove", post(http::remove_item))
        // System endpoints
        .route("/status", get(http::get_status))
        .merge(items)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Start the server; returns after a ctrl-c shutdown.
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Inventory server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    state.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
