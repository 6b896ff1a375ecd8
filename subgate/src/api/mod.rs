//! HTTP API surface: request/response models and route handlers.

pub mod handlers;
pub mod models;
