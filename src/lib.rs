//! Values API Library
//!
//! A minimal key-value record service over HTTP, plus the randomized workload
//! client that exercises it. Both binaries (`main.rs`, `bin/workload.rs`) are
//! thin wrappers around these modules.
//!
//! ## Modules
//! - **`config`**: settings file loading and validation for both binaries.
//! - **`storage`**: the `RecordStore` contract with its in-memory (`DashMap`) and
//!   durable (MongoDB) backends.
//! - **`api`**: the `api/values` REST surface built with axum on top of any `RecordStore`.
//! - **`client`**: the workload client: command scheduler, request builder and driver loop.
//! - **`telemetry`**: tracing subscriber initialization.

pub mod api;
pub mod client;
pub mod config;
pub mod storage;
pub mod telemetry;
