//! Task module
//!
//! This module contains task-related types, validation and storage.

mod memory_store;
mod model;
mod repository;
mod sqlite_store;
mod validation;

pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use repository::TaskRepository;
pub use sqlite_store::SqliteTaskStore;
pub use validation::{TaskValidator, ValidationErrors};
