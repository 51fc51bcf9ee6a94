pub mod audit;
pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod telemetry;

pub use fingerprint::{compute_fingerprint, verify_fingerprint};
