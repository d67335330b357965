//! HTTP gateway: router construction, authentication, and route handlers.

pub mod admin;
pub mod auth;
pub mod license;
pub mod response;
pub mod server;
pub mod tasks;

pub use response::{ApiError, ApiResult};
pub use server::{AppState, GatewayServer};
