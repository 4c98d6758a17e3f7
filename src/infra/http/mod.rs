//! HTTP surface: the admin router and the middleware wrapped around it.

mod admin;
mod middleware;

pub use admin::{AdminState, build_admin_router};
pub use middleware::RequestContext;
