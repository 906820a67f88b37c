//! Application state

use std::sync::Arc;

use tasks_core::task::{TaskRepository, TaskValidator};

use crate::middleware::CredentialCheck;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: Arc<dyn TaskRepository>,
    validator: TaskValidator,
    credentials: Arc<dyn CredentialCheck>,
}

impl AppState {
    pub fn new(
        task_store: Arc<dyn TaskRepository>,
        validator: TaskValidator,
        credentials: Arc<dyn CredentialCheck>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                task_store,
                validator,
                credentials,
            }),
        }
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &dyn TaskRepository {
        self.inner.task_store.as_ref()
    }

    pub fn validator(&self) -> &TaskValidator {
        &self.inner.validator
    }

    pub fn credentials(&self) -> &dyn CredentialCheck {
        self.inner.credentials.as_ref()
    }
}
