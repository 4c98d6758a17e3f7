//! Domain layer: read-only view models of backend-owned records.

pub mod de;
pub mod entities;
pub mod error;
pub mod types;
