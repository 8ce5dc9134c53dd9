use serde_json::Value;
use vigil_core::RemoteId;

use crate::cache::{CacheKey, DetailCache};
use crate::error::ApiError;
use crate::parallel::parallel;
use crate::remote::Remote;

/// Concurrent `show` calls while filling details.
pub const DETAIL_WORKERS: usize = 10;

/// Merge each list entry with its full definition.
///
/// Some list endpoints return partial payloads, so a diff against them
/// would be noise. Details are cached per `(kind, id)` and refetched only
/// when the entry's `modified_at` changes; entries without one always
/// refetch.
pub async fn fill_details<R: Remote + ?Sized>(
    remote: &R,
    cache: &DetailCache,
    api_resource: &str,
    items: Vec<Value>,
) -> Result<Vec<Value>, ApiError> {
    parallel(items, DETAIL_WORKERS, |item| async move {
        let id = RemoteId::of(&item).ok_or_else(|| ApiError::UnexpectedResponse {
            path: format!("/api/v1/{api_resource}"),
            detail: "list entry without id".into(),
        })?;
        let token = item.get("modified_at").and_then(Value::as_str).map(str::to_owned);

        let full = match token {
            Some(token) => {
                let key = CacheKey::new(api_resource, &id);
                cache
                    .fetch(&key, &token, || remote.show(api_resource, &id))
                    .await?
            }
            None => remote.show(api_resource, &id).await?,
        };
        Ok(merge(item, full))
    })
    .await
}

fn merge(mut base: Value, full: Value) -> Value {
    match (&mut base, full) {
        (Value::Object(base_map), Value::Object(full_map)) => {
            base_map.extend(full_map);
            base
        }
        (_, full) => full,
    }
}
