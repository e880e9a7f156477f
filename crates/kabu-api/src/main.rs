//! 주식 스냅샷 API 서버.
//!
//! Axum 기반 HTTP 서버를 시작합니다.
//! `DATABASE_URL`이 설정되어 있으면 PostgreSQL 캐시를, 없으면 메모리 캐시를 사용합니다.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use kabu_api::metrics::setup_metrics_recorder;
use kabu_api::routes::create_router;
use kabu_api::state::AppState;
use kabu_core::{init_logging_from_env, AppConfig, DatabaseConfig};
use kabu_data::{Database, KabutanFetcher, MemorySnapshotStore, PgSnapshotStore, SnapshotStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // .env 로드 포함
    let config = AppConfig::from_env();

    init_logging_from_env()?;

    info!("Starting Kabu snapshot server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let (store, database) = create_store(&config.database).await?;
    let fetcher = Arc::new(KabutanFetcher::new(&config.fetcher)?);

    let state = Arc::new(AppState::from_parts(fetcher, store, &config.cache));
    let writer = state.writer().clone();

    info!(
        version = %state.version,
        store = state.store().backend_name(),
        ttl_secs = config.cache.ttl_secs,
        source = %config.fetcher.base_url,
        "Application state initialized"
    );

    let request_timeout = config.request_timeout();
    if request_timeout > config.server.request_timeout() {
        warn!(
            configured_secs = config.server.request_timeout_secs,
            effective_secs = request_timeout.as_secs(),
            fetch_timeout_secs = config.fetcher.timeout_secs,
            "REQUEST_TIMEOUT_SECS가 FETCH_TIMEOUT_SECS 이하이므로 요청 타임아웃을 늘립니다"
        );
    }

    let app = create_router(state, metrics_handle, request_timeout);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(
            addr = %addr,
            error = %e,
            "소켓 바인딩 실패. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown initiated, draining cache writes...");

    let drained = writer.shutdown(config.cache.shutdown_drain()).await;
    let stats = writer.stats();
    if drained {
        info!(
            written = stats.written,
            failed = stats.failed,
            dropped = stats.dropped,
            "Cache writer drained"
        );
    } else {
        warn!(
            pending = writer.pending(),
            "Cache writer drain timeout, pending writes discarded"
        );
    }

    if let Some(db) = database {
        db.close().await;
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// 캐시 저장소 생성.
///
/// DB URL이 없으면 메모리 저장소를 사용합니다. URL이 있는데 연결에 실패하면 시작을 중단합니다.
async fn create_store(
    config: &DatabaseConfig,
) -> Result<(Arc<dyn SnapshotStore>, Option<Database>), BoxError> {
    if config.url.is_none() {
        warn!("DATABASE_URL not set, using in-memory snapshot cache");
        return Ok((Arc::new(MemorySnapshotStore::new()), None));
    }

    let db = Database::connect(config).await?;
    if config.run_migrations {
        db.migrate().await?;
    }

    Ok((Arc::new(PgSnapshotStore::new(db.clone())), Some(db)))
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
