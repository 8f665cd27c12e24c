//! HTTP API

pub mod cors;
pub mod server;

pub use server::{router, serve, AppState};
