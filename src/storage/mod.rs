//! Record Storage Module
//!
//! Holds the `id -> value` records served by the HTTP API.
//!
//! ## Core Concepts
//! - **Contract**: `RecordStore` is the capability set every backend honors
//!   (get-all, get-by-id, create, update, delete). The HTTP layer only ever sees
//!   `Arc<dyn RecordStore>`.
//! - **Memory backend**: `MemoryStore`, a concurrent map shared by all request workers.
//! - **Durable backend**: `MongoStore`, records persisted in a MongoDB collection that
//!   is lazily ensured on first use.
//! - **Absence**: a missing id is a normal outcome (`None` / `false`), never an error.

pub mod backend;
pub mod memory;
pub mod mongo;
pub mod types;

pub use backend::{RecordStore, open_store};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use types::{Record, StoreError, StoreResult};
