use crate::cli::ServeArgs;
use crate::infra::{AppState, FsResumeStore};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credential_board::auth::SessionStore;
use credential_board::board::{Board, InMemoryBoardStore};
use credential_board::config::AppConfig;
use credential_board::error::AppError;
use credential_board::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sessions = SessionStore::new(config.auth.session_ttl());
    spawn_session_sweeper(sessions.clone());

    let board = Arc::new(Board::new(
        Arc::new(InMemoryBoardStore::default()),
        Arc::new(FsResumeStore::new(config.storage.resume_dir.clone())),
        sessions,
        config.storage.max_resume_bytes,
    ));

    let app = with_board_routes(board)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        resume_dir = %config.storage.resume_dir.display(),
        "credential board ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_session_sweeper(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match sessions.reap_expired() {
                Ok(0) => {}
                Ok(reaped) => debug!(reaped, "expired sessions removed"),
                Err(err) => warn!(error = %err, "session sweep failed"),
            }
        }
    });
}
