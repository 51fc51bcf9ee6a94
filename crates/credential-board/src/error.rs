//! Failures that end a command: bad configuration, logging setup, I/O, or an unreadable audit
//! export. Request-level failures are `board::BoardError` and never reach this type.

use crate::audit::AuditError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit error: {0}")]
    Audit(#[from] AuditError),
}
