//! Virtual Try-On Studio
//!
//! Upload a photo of a person and one or more outfit photos, send them to a
//! multimodal image model, and get back one composite of the person wearing
//! the outfit.

pub mod api;
pub mod config;
pub mod error;
pub mod image;
pub mod provider;
pub mod studio;
pub mod tryon;
pub mod upload;

pub use error::{AppError, Result};

use std::sync::Arc;

use studio::Studio;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub studio: Arc<Studio>,
}
