//! # echo-service
//!
//! A small axum service with a fixed route table:
//!
//! | Method | Path        | Response                                   |
//! |--------|-------------|--------------------------------------------|
//! | GET    | `/`         | service name, API version, endpoint list   |
//! | GET    | `/health`   | `{"status":"healthy","timestamp":<unix s>}` |
//! | POST   | `/api/echo` | `{"echo":<message>,"length":<chars>}`      |
//!
//! Configuration comes from the environment (`PORT`, `HOST`, ...), an
//! optional `.env` file and an optional file named by `CONFIG_FILE`.
//!
//! ## Features
//!
//! - `compression` (default) - compress responses when the client asks
//! - `cors` - CORS headers for the origins in `cors_origins`

pub mod config;
mod error;
pub mod layer;
mod router;
pub mod routes;
mod server;

pub use config::{Port, ServiceConfig};
pub use error::{EchoError, ErrorResponse, HttpError};
pub use router::{app, RouterExt};
pub use server::{serve_router, serve_with_shutdown, ServerError};
pub use service_kit::{ConfigError, Environment, LogFormat};
