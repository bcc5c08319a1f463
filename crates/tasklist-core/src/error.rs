//! Errors raised by the task store.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, StoreError>;
