pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sinks;
pub mod timestamp;
pub mod types;
pub mod validate;
