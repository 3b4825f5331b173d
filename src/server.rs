//! Server initialization and startup.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autonom_api::{ApiConfig, ApiServer, AppState};
use autonom_catalog::{catalog_router, Catalog, HttpCatalog, StaticCatalog};
use autonom_config::{CatalogConfig, Config, ConfigLoader, LoggingConfig, StorageConfig};
use autonom_planner_catalog::CatalogPlanner;
use autonom_protocols::planner::Planner;
use autonom_protocols::profile::ProfileStore;
use autonom_protocols::session::SessionStore;
use autonom_runtime::{
    ControllerConfig, MemoryProfileStore, MemorySessionStore, MockOrderExecutor, TimeoutPlanner,
    WorkflowController,
};
use autonom_store_sqlite::SqliteDatabase;

type BoxError = Box<dyn std::error::Error>;

fn expand(path: &std::path::Path) -> PathBuf {
    ConfigLoader::expand_path(&path.to_string_lossy())
}

/// Console plus daily rolling file output.
///
/// `RUST_LOG` wins over `logging.level`.
pub(crate) fn init_tracing(config: &LoggingConfig) -> Result<(), BoxError> {
    let log_dir = expand(&config.log_dir());
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("autonom")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    static GUARD: OnceLock<WorkerGuard> = OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Session and profile stores for the configured backend.
pub(crate) async fn open_stores(
    config: &StorageConfig,
) -> Result<(Arc<dyn SessionStore>, Arc<dyn ProfileStore>), BoxError> {
    if config.backend == "memory" {
        info!("Using in-memory stores; sessions are lost on exit");
        return Ok((
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryProfileStore::new()),
        ));
    }

    let path = expand(&config.database_path());
    let db = SqliteDatabase::open(&path).await?;
    info!(path = %path.display(), "Opened SQLite store");
    Ok((Arc::new(db.session_store()), Arc::new(db.profile_store())))
}

/// In-process catalog from `data_path`, or the embedded data.
async fn static_catalog(config: &CatalogConfig) -> Result<StaticCatalog, BoxError> {
    Ok(match &config.data_path {
        Some(path) => StaticCatalog::load(&expand(path)).await?,
        None => StaticCatalog::embedded()?,
    })
}

/// Catalog the planner reads: remote when `base_url` is set.
async fn planner_catalog(config: &CatalogConfig) -> Result<Arc<dyn Catalog>, BoxError> {
    if let Some(base_url) = &config.base_url {
        info!(base_url = %base_url, "Using remote catalog");
        let client =
            HttpCatalog::with_timeout(base_url, Duration::from_secs(config.timeout_seconds))?;
        return Ok(Arc::new(client));
    }
    Ok(Arc::new(static_catalog(config).await?))
}

pub(crate) async fn build_controller(config: &Config) -> Result<WorkflowController, BoxError> {
    let (sessions, profiles) = open_stores(&config.storage).await?;

    let catalog = planner_catalog(&config.catalog).await?;
    let planner = CatalogPlanner::new(catalog)
        .with_options_count(config.planner.options_count)
        .with_items_per_option(config.planner.items_per_option);
    let planner: Arc<dyn Planner> = Arc::new(TimeoutPlanner::new(
        Arc::new(planner),
        Duration::from_secs(config.planner.timeout_seconds),
    ));

    let controller_config = ControllerConfig {
        app_name: config.storage.app_name.clone(),
        stream_buffer: config.workflow.stream_buffer,
        enforce_schedule: config.workflow.enforce_schedule,
    };
    Ok(WorkflowController::new(
        sessions,
        profiles,
        planner,
        Arc::new(MockOrderExecutor::new()),
        controller_config,
    ))
}

/// Run the workflow API in the foreground.
pub(crate) async fn run_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), BoxError> {
    info!("Starting autonom v{}", env!("CARGO_PKG_VERSION"));

    let controller = build_controller(&config).await?;
    let api_config = ApiConfig::new(
        host.unwrap_or(config.server.host),
        port.unwrap_or(config.server.port),
    );
    let server = ApiServer::new(api_config, Arc::new(AppState::new(controller)));
    server.run().await
}

/// Run the catalog lookup service in the foreground.
pub(crate) async fn run_catalog(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), BoxError> {
    let catalog = static_catalog(&config.catalog).await?;
    let count = catalog.len();
    let app = catalog_router(Arc::new(catalog));

    let addr = format!(
        "{}:{}",
        host.unwrap_or(config.catalog.host),
        port.unwrap_or(config.catalog.port)
    );
    let listener = TcpListener::bind(&addr).await?;
    info!(restaurants = count, "Catalog service listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
