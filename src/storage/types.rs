//! Storage Data Types
//!
//! The record shape shared by every backend and the errors a backend may report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single `(id, value)` pair held by the store.
///
/// `id` is unique within the store at any point in time. `value` is opaque;
/// the store places no constraints on its content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Record {
    pub id: String,
    pub value: String,
}

impl Record {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Failures a backend can report.
///
/// Note that "record not found" is deliberately absent: reads return `None`
/// and id-dependent writes report whether they touched anything.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create` was called with an id that is already live.
    #[error("record {0} already exists")]
    AlreadyExists(String),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
