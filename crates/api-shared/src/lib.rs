//! # API Shared
//!
//! Shared definitions for the Mobi Mama APIs.
//!
//! Contains:
//! - Request/response types (`dto` module) with OpenAPI schemas
//! - Conversions between those types and `mobimama-core` domain types
//! - Shared services like `HealthService`

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
