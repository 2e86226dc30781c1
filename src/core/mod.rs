// src/core/mod.rs
//! Core services: HTTP client, request de-duplication, retry, session storage

pub mod database;
pub mod dedup;
pub mod fs_ops;
pub mod retry;
pub mod service_client;

pub use database::{Cookie, SessionStore};
pub use dedup::PendingRequests;
pub use fs_ops::FsOps;
pub use retry::{retry_operation, RetryError};
pub use service_client::ServiceClient;
