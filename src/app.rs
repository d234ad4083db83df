use crate::catalog::{CatalogApi, CatalogClient, FetchError};
use crate::config::Settings;
use crate::models::MovieRecord;
use crate::selector::{MovieSelector, RandomIndex};
use crate::store::CacheStore;
use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

const MAX_BODY_BYTES: usize = 16 * 1024;
pub const NO_DATA_MESSAGE: &str = "No IMDb data returned";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save IMDb data";
pub const NOTHING_CACHED_MESSAGE: &str = "No movie cached yet";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogApi>,
    pub store: Arc<CacheStore>,
    pub selector: MovieSelector,
}

/// What a page request renders: a movie, an error, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<MovieRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MoviePage {
    fn movie(movie: MovieRecord) -> Self {
        Self {
            movie: Some(movie),
            error_message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            movie: None,
            error_message: Some(message.into()),
        }
    }
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        let catalog: Arc<dyn CatalogApi> = Arc::new(CatalogClient::new(
            settings.top_250_url.clone(),
            settings.api_key.clone(),
        ));
        Self {
            catalog,
            store: Arc::new(CacheStore::new(settings.cache_path())),
            selector: MovieSelector::new(Arc::new(RandomIndex::new())),
        }
    }

    /// Picks a random movie from the cache; any read failure counts as empty.
    pub async fn cached_movie(&self) -> Option<MovieRecord> {
        match self.store.read().await {
            Ok(snapshot) => self.selector.pick(snapshot.as_ref()),
            Err(e) => {
                error!("Ignoring unreadable movie cache: {:?}", e);
                None
            }
        }
    }

    pub async fn view(&self) -> MoviePage {
        match self.cached_movie().await {
            Some(movie) => MoviePage::movie(movie),
            None => MoviePage::error(NOTHING_CACHED_MESSAGE),
        }
    }

    /// Serves from cache when possible, otherwise fetches, stores and picks.
    pub async fn refresh(&self) -> MoviePage {
        if let Some(movie) = self.cached_movie().await {
            return MoviePage::movie(movie);
        }

        info!("Cache empty, fetching Top 250 catalog");
        let snapshot = match self.catalog.fetch_catalog().await {
            Ok(s) => s,
            Err(e) => {
                warn!("Refresh aborted: {}", e);
                return MoviePage::error(user_message(&e));
            }
        };

        if let Err(e) = self.store.write(&snapshot).await {
            error!("Failed to persist catalog: {:?}", e);
            return MoviePage::error(SAVE_FAILED_MESSAGE);
        }
        info!(
            "Cached {} movies at {}",
            snapshot.items.len(),
            self.store.path().display()
        );

        self.cached_movie()
            .await
            .map(MoviePage::movie)
            .unwrap_or_default()
    }
}

fn user_message(err: &FetchError) -> String {
    match err {
        FetchError::RemoteError(message) => message.clone(),
        FetchError::NoResponse | FetchError::Status(_) | FetchError::Transport(_) => {
            NO_DATA_MESSAGE.to_string()
        }
    }
}

pub async fn run_server(settings: Settings) -> Result<()> {
    info!("Starting with {:?}", settings);
    let state = AppState::from_settings(&settings);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_view).post(handle_refresh))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn handle_view(State(state): State<AppState>) -> Json<MoviePage> {
    Json(state.view().await)
}

async fn handle_refresh(State(state): State<AppState>) -> Json<MoviePage> {
    Json(state.refresh().await)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
