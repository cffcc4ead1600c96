//! grading-store — persistence for grades and grading scales.
//!
//! # Architecture
//!
//! The [`GradeStore`] trait is the only seam the grading engine sees. Two
//! implementations ship with the crate:
//!
//! - [`PgGradeStore`] runs the read queries against PostgreSQL through a
//!   shared `sqlx::PgPool`.
//! - [`MemoryGradeStore`] keeps everything in process and supports fault
//!   injection, for tests and local development.
//!
//! Schema migrations are embedded at compile time and applied with
//! [`migrate`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod queries;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryGradeStore;
pub use postgres::{PgGradeStore, connect, migrate};
pub use store::GradeStore;
