//! # Store Adapter
//!
//! Namespace-scoped field storage with a shared, namespace-wide expiry.
//!
//! - [`HashBackend`] is the store protocol (field set/get/delete, field
//!   listing, namespace expiry).
//! - [`RedisBackend`](crate::connection::RedisBackend) speaks it to Redis.
//! - [`MemoryBackend`] keeps the same semantics in process.
//! - [`StoreAdapter`] exposes `set`, `get`, `set_expiry` and `clear` on top of
//!   any backend.
//!
//! Absence is a normal outcome: `get` returns `Ok(None)` and clearing an
//! empty namespace does nothing. Transport failures surface as
//! [`CacheError::StoreUnavailable`](crate::error::CacheError::StoreUnavailable)
//! and are never retried here.

pub mod adapter;
pub mod backend;
pub mod memory;

pub use adapter::StoreAdapter;
pub use backend::HashBackend;
pub use memory::MemoryBackend;
