//! Aklatan School Library Circulation Server
//!
//! A Rust implementation of the Aklatan circulation engine, providing a
//! REST JSON API for catalog registration, patron registration and the
//! borrow/return/fine lifecycle of physical book copies.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod fines;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
