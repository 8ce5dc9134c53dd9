use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use vigil_core::RemoteId;

use crate::error::ApiError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote operations the syncer needs, per resource collection
/// (`api_resource` is e.g. "monitor", "dashboard", "slo").
///
/// Methods return boxed futures for dyn compatibility.
pub trait Remote: Send + Sync {
    /// Every item of the collection. Implementations page through the
    /// collection themselves; `limit`/`offset` are not accepted.
    fn list<'a>(
        &'a self,
        api_resource: &'a str,
        params: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, Result<Vec<Value>, ApiError>>;

    /// Full definition of one item.
    fn show<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
    ) -> BoxFuture<'a, Result<Value, ApiError>>;

    /// Create an item; the reply carries the assigned id.
    fn create<'a>(
        &'a self,
        api_resource: &'a str,
        payload: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ApiError>>;

    fn update<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
        payload: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ApiError>>;

    /// Delete an item. An item that is already gone is not an error.
    fn delete<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
    ) -> BoxFuture<'a, Result<(), ApiError>>;

    /// Web UI root used to build links to resources.
    fn base_url(&self) -> &str;
}
