//! Application services: list state, backend access, forms and the
//! interactive behaviours behind the admin pages.

pub mod admin;
pub mod backend;
pub mod error;
pub mod format;
pub mod forms;
pub mod list_query;
pub mod pagination;
pub mod resources;
pub mod sequence;
pub mod stream;
pub mod ui;
pub mod uploads;
