//! tapquest server: sqlx-backed storage and the axum HTTP gateway.

pub mod cli;
pub mod db;
pub mod gateway;
pub mod store;

pub use db::Database;
pub use gateway::GatewayServer;
