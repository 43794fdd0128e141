use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, patch, post};
use bannerd_auth::{AuthState, JwtService, SigninService};
use bannerd_storage::{DynBannerStorage, DynUserStorage};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::bootstrap;
use crate::cache::{CacheBackend, ReadCache, create_cache_backend};
use crate::config::{AppConfig, StorageBackend};
use crate::handlers;
use crate::service::{BannerService, CacheSynchronizer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub banners: BannerService,
    pub auth: AuthState,
    pub signin: SigninService,
    /// Kept for readiness checks; the service reads through it as a `ReadCache`.
    pub cache: CacheBackend,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/signin", post(handlers::signin))
        .route("/user_banner", get(handlers::user_banner))
        .route(
            "/banner",
            get(handlers::list_banners).post(handlers::create_banner),
        )
        .route(
            "/banner/{id}",
            patch(handlers::update_banner).delete(handlers::delete_banner),
        )
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn open_storage(cfg: &AppConfig) -> anyhow::Result<(DynBannerStorage, DynUserStorage)> {
    match cfg.storage.backend {
        StorageBackend::Postgres => {
            let storage = bannerd_db_postgres::create_storage(cfg.storage.postgres.clone())
                .await
                .context("failed to open postgres storage")?;
            Ok((storage.clone(), storage))
        }
        StorageBackend::Memory => {
            let storage = bannerd_db_memory::create_storage();
            tracing::warn!("memory storage is process-local and not persisted");
            Ok((storage.clone(), storage))
        }
    }
}

/// Wires storage, the read cache, auth and the synchronizer from config.
///
/// The synchronizer is returned unstarted.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<(AppState, CacheSynchronizer)> {
    cfg.validate().map_err(anyhow::Error::msg)?;

    let (banner_storage, user_storage) = open_storage(cfg).await?;
    tracing::info!(backend = banner_storage.backend_name(), "storage ready");
    bootstrap::ensure_users(user_storage.as_ref(), &cfg.bootstrap.users)
        .await
        .context("failed to create bootstrap users")?;

    let cache = create_cache_backend(&cfg.redis).await;
    let read_cache: Arc<dyn ReadCache> = Arc::new(cache.clone());

    let banners = BannerService::new(banner_storage.clone(), read_cache.clone());
    let jwt = Arc::new(JwtService::hs256(
        cfg.auth.secret.as_bytes(),
        cfg.auth.token_ttl(),
    ));
    let signin = SigninService::new(user_storage, jwt.clone());
    let synchronizer = CacheSynchronizer::new(
        banner_storage,
        read_cache,
        cfg.cache.ttl(),
        cfg.cache.sync_interval(),
    )?;

    let state = AppState {
        banners,
        auth: AuthState::new(jwt),
        signin,
        cache,
    };
    Ok((state, synchronizer))
}

pub struct BannerServer {
    addr: SocketAddr,
    app: Router,
    synchronizer: CacheSynchronizer,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<BannerServer> {
        let (state, synchronizer) = build_state(&self.config).await?;
        let app = build_app(state, &self.config);

        Ok(BannerServer {
            addr: self.addr,
            app,
            synchronizer,
        })
    }
}

impl BannerServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves until Ctrl+C, then stops the synchronizer.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let sync = self.synchronizer.start();
        tracing::info!("listening on {}", self.addr);

        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sync.stop().await;
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
