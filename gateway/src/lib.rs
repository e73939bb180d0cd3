//! Gateway between a browser client and the SAP Business One Service Layer.
//!
//! The gateway logs users in against the Service Layer, keeps the resulting
//! sessions in memory behind opaque bearer tokens, and re-exposes a few
//! read-only resources as a small JSON API next to the prebuilt web client.

pub mod api;
pub mod auth;
pub mod http_server;
pub mod session;

pub use http_server::{router, run_server, AppState};
