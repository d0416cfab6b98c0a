pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod parser;

pub use analyzer::{aggregate, classify, resolve_range, ReportingPeriod};
pub use config::AppConfig;
pub use error::AppError;
pub use parser::InfractionRecord;

// ─── E2E Integration Tests ──────────────────────────────────────────────────
