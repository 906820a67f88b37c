//! Core library for the task manager
//!
//! This crate contains the storage side of the service:
//! - Task model and validation rules
//! - The `TaskRepository` capability trait
//! - SQLite and in-memory repository implementations

pub mod error;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
