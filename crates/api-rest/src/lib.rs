//! # API REST
//!
//! REST API implementation for Mobi Mama.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response types and `mobimama-core` for the services.

#![warn(rust_2018_idioms)]

mod routes;

pub use routes::{router, ApiDoc, AppState};
