//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the read-all/write-all contract over named collections.
//! - Isolate file/SQLite details from the query and mutation services.
//!
//! # Invariants
//! - `read_all` returns rows in store order.
//! - `write_all` replaces the whole collection.

pub mod csv_store;
pub mod memory_store;
pub mod record_store;
pub mod sqlite_store;
