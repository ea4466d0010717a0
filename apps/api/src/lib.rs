//! Responsive slide layout engine and the HTTP service around it.
//!
//! [`layout`] is a pure library: grid geometry, breakpoint classification,
//! font sizing and WCAG contrast checks. [`routes`] exposes it over axum.

pub mod config;
pub mod errors;
pub mod layout;
pub mod routes;
pub mod state;
