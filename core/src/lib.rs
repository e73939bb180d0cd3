// Core Service Layer functionality:
// - HTTP client for the SAP Business One Service Layer
// - Wire types and the reshaping applied before data reaches the web client
// - Configuration loading
// - Shared error types

// Export client module - Service Layer client
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;
