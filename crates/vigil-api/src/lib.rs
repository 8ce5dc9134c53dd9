//! vigil-api
//!
//! Remote access for the reconciler: an authenticated client for the
//! monitoring service's v1 API (pagination, retry, idempotent delete),
//! plus the persistent detail cache used to enrich partial list payloads.
//!
//! Everything quirky about the remote API lives here so it does not leak
//! into the syncer.

pub mod cache;
pub mod client;
pub mod config;
pub mod details;
pub mod error;
pub mod parallel;
pub mod remote;

pub use crate::cache::{CacheKey, DetailCache};
pub use crate::client::Api;
pub use crate::config::ApiConfig;
pub use crate::details::fill_details;
pub use crate::error::{ApiError, CacheError, RequestError};
pub use crate::parallel::parallel;
pub use crate::remote::{BoxFuture, Remote};
