#![deny(missing_docs)]

//! Core library for the Rusty Students records service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Concurrent in-memory student store.
pub mod store;
/// Student record model and validation rules.
pub mod student;
/// LLM-backed student summaries.
pub mod summary;
