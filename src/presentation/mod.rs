//! Askama view models and template bindings.

pub mod admin;
pub mod views;
