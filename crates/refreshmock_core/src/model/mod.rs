//! Record model for the issue/project collections.
//!
//! # Responsibility
//! - Define the flat row shape shared by every store backend.
//! - Define typed issue/project records used by the mutation simulator.
//! - Own the single timestamp format used for `updatedAt`/`deletedAt`.
//!
//! # Invariants
//! - Every record is identified by a stringified integer `id`, never reused.
//! - Deletion is represented by soft-delete tombstones (`deletedAt` plus a
//!   terminal `deleted` status), not hard delete.

pub mod issue;
pub mod project;
pub mod record;
pub mod timestamp;
