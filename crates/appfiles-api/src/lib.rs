//! Appfiles API
//!
//! HTTP front serving installed application files through the configured
//! storage backend.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
