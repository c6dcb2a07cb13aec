//! Core use-case services.
//!
//! # Responsibility
//! - Query service: the read path behind the HTTP endpoints.
//! - Mutation simulator: the write path run between test cycles.
//! - Keep HTTP/CLI layers decoupled from storage details.

pub mod clock;
pub mod fixture;
pub mod query_service;
pub mod range;
pub mod simulator;
