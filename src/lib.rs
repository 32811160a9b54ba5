#![deny(missing_docs)]

//! Core library for the PDF question-answering gateway.

/// HTTP routing and REST handlers.
pub mod api;
/// QA capability abstraction and adapters.
pub mod capability;
/// Environment-driven configuration management.
pub mod config;
/// PDF discovery, conversion, and the in-memory corpus store.
pub mod corpus;
/// Structured logging and tracing setup.
pub mod logging;
/// Query and ingestion counters.
pub mod metrics;
/// Query request handling.
pub mod qa;
/// Startup wiring shared by both service variants.
pub mod server;
