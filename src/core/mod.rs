pub mod types;
pub mod document;
pub mod config;
pub mod error;
pub mod stats;
pub mod cancellation;
