//! The fixed route table.

mod echo;
mod fallback;
mod health;
mod info;

pub use echo::{echo_routes, EchoRequest, EchoResponse, ECHO_PATH};
pub use fallback::fallback_handler;
pub use health::{health_routes, HealthResponse, HEALTH_PATH};
pub use info::{info_routes, InfoResponse, API_VERSION, ENDPOINTS};
