//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod backend;
pub mod error;
pub mod http;
pub mod telemetry;
