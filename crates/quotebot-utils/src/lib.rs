//! Shared utilities for quotebot
//!
//! This crate provides common functionality used across the quotebot workspace,
//! including logging setup and attachment identifiers.

pub mod ids;
pub mod logging;

pub use ids::attachment_id;
pub use logging::init_tracing;
