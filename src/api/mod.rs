//! API Module
//!
//! HTTP handlers and routing for the sample enemy cache server.
//!
//! # Endpoints
//! - `PUT /enemy` - Insert a record
//! - `POST /enemy` - Replace a record by address
//! - `GET /enemy/:address` - Fetch a record
//! - `DELETE /enemy/:address` - Remove a record
//! - `GET /enemies` - List all records
//! - `GET /has/:address` - Membership check
//! - `GET /stats` - Persistence statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
