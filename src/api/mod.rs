//! API Module
//!
//! HTTP handlers and routing exposing the cache facade and rate limiter.
//!
//! # Endpoints
//! - `GET /health` - Store reachability
//! - `GET /stats` - Cache statistics
//! - `PUT /cache/:domain/:key` - Cache a JSON value
//! - `GET /cache/:domain/:key` - Read a cached value
//! - `DELETE /cache/:domain/:key` - Remove a cached value
//! - `POST /rate-limit/check` - Count a request against a budget

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
