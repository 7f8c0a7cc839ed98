//! At-most-once lazy construction of a tool's backend.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::errors::AgentBayError;

/// Holds a backend built on first use and shared by every later call.
///
/// Concurrent first calls run the factory once. A failed construction is not
/// cached; the next call tries again.
pub struct LazyBackend<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
    factory: Box<dyn Fn() -> Result<Arc<T>, AgentBayError> + Send + Sync>,
}

impl<T: ?Sized + Send + Sync> LazyBackend<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<T>, AgentBayError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// Already-built backend; the factory is never consulted.
    pub fn ready(backend: Arc<T>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(backend)),
            factory: Box::new(|| {
                Err(AgentBayError::InternalError(
                    "backend factory called on a pre-initialized backend".to_string(),
                ))
            }),
        }
    }

    pub async fn get(&self) -> Result<Arc<T>, AgentBayError> {
        self.cell
            .get_or_try_init(|| async { (self.factory)() })
            .await
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}
