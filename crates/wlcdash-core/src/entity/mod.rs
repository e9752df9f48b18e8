// ── Refreshable entities ──

pub mod application;
pub mod client;

pub use application::{Application, select_app};
pub use client::Client;

/// Row budget for per-client application grids.
pub(crate) const CLIENT_APPS_PAGE: u64 = 200;
