//! HTTP API Module
//!
//! Adapts the `api/values` REST surface onto a `RecordStore`.
//!
//! | Method | Path | Store call |
//! |---|---|---|
//! | GET | `/api/values` | `get_all` |
//! | GET | `/api/values/{id}` | `get_by_id` (missing id -> `null`) |
//! | POST | `/api/values` | `create` with a server-generated id |
//! | PUT | `/api/values/{id}` | `update` (accepted even if absent) |
//! | DELETE | `/api/values/{id}` | `delete` (accepted even if absent) |
//!
//! ## Submodules
//! - **`protocol`**: endpoint paths and request/response bodies.
//! - **`handlers`**: axum handlers, one per row above.
//! - **`error`**: mapping of validation and store failures to HTTP responses.
//! - **`router`**: assembles the handlers and injects the store.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod router;

pub use error::ApiError;
pub use router::router;
