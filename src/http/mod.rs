//! HTTP API for the browser front-end
//!
//! Exposes recording control, session state, text edits, and analysis as a
//! small JSON API; the presentation layer is a pure consumer of these
//! endpoints.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
