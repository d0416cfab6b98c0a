pub mod bilan;
pub mod config;
pub mod import;
pub mod stock;
