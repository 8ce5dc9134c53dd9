use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde_json::{Map, Value};
use vigil_core::RemoteId;

use crate::config::ApiConfig;
use crate::error::{ApiError, RequestError};
use crate::remote::{BoxFuture, Remote};

/// Page size used for paginated collections.
pub const PAGE_SIZE: usize = 1000;

/// Attempts per call when the connection fails or times out.
const NETWORK_ATTEMPTS: usize = 2;
/// Full attempts for a GET answered with a 5xx.
const SERVER_ERROR_ATTEMPTS: usize = 2;

/// Client for the v1 API. Knows the per-collection response wrappers
/// (dashboards nested under `dashboards`, SLOs under `data`) and which
/// collections paginate.
#[derive(Debug, Clone)]
pub struct Api {
    client: reqwest::Client,
    config: ApiConfig,
}

impl Api {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { client, config })
    }

    async fn list_page(
        &self,
        api_resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>, ApiError> {
        let path = format!("/api/v1/{api_resource}");
        let response = self.request(Method::GET, &path, None, params, false).await?;
        let response = match api_resource {
            "dashboard" => take_field(response, "dashboards", &path)?,
            "slo" => take_field(response, "data", &path)?,
            _ => response,
        };
        match response {
            Value::Array(items) => Ok(items),
            other => Err(ApiError::UnexpectedResponse {
                path,
                detail: format!("expected a list, got {other}"),
            }),
        }
    }

    /// Request `limit`/`offset` pages until one comes back short.
    async fn list_paginated(
        &self,
        api_resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Value>, ApiError> {
        let limit = PAGE_SIZE.to_string();
        let mut offset = 0;
        let mut all = Vec::new();

        loop {
            let offset_param = offset.to_string();
            let mut paged = params.to_vec();
            paged.push(("limit", limit.as_str()));
            paged.push(("offset", offset_param.as_str()));

            let page = self.list_page(api_resource, &paged).await?;
            let size = page.len();
            all.extend(page);
            if size < PAGE_SIZE {
                tracing::debug!(
                    resource = api_resource,
                    count = all.len(),
                    "listed paginated resources"
                );
                return Ok(all);
            }
            offset += PAGE_SIZE;
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
        ignore_404: bool,
    ) -> Result<Value, ApiError> {
        let url = self.url(path, params)?;
        let display_path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let mut attempt = 1;
        let (status, text) = loop {
            let (status, text) = self
                .send(&method, &url, body)
                .await
                .map_err(|e| request_error(&method, &display_path, body, None, e.to_string()))?;

            if attempt >= SERVER_ERROR_ATTEMPTS
                || method != Method::GET
                || !status.is_server_error()
            {
                break (status, text);
            }
            tracing::warn!(status = %status, path = %display_path, "retrying on server error");
            attempt += 1;
        };

        if status == StatusCode::NOT_FOUND && ignore_404 {
            tracing::debug!(path = %display_path, "ignoring 404");
            return Ok(Value::Object(Map::new()));
        }
        if !status.is_success() {
            return Err(request_error(&method, &display_path, body, Some(status), text).into());
        }

        if text.trim().is_empty() {
            Ok(Value::Object(Map::new()))
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    /// One call, retried when the connection fails or times out.
    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let mut attempt = 1;
        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header(CONTENT_TYPE, "application/json")
                .header("DD-API-KEY", &self.config.api_key)
                .header("DD-APPLICATION-KEY", &self.config.app_key);
            if let Some(body) = body {
                request = request.json(body);
            }

            let result = async move {
                let response = request.send().await?;
                let status = response.status();
                Ok::<_, reqwest::Error>((status, response.text().await?))
            }
            .await;

            match result {
                Err(e) if attempt < NETWORK_ATTEMPTS && (e.is_connect() || e.is_timeout()) => {
                    tracing::warn!(error = %e, url = %url, attempt, "retrying after network error");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let raw = format!("{}{path}", self.config.base_url);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw.clone(),
            detail: e.to_string(),
        })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

impl Remote for Api {
    fn list<'a>(
        &'a self,
        api_resource: &'a str,
        params: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, Result<Vec<Value>, ApiError>> {
        Box::pin(async move {
            if let Some((param, _)) = params.iter().find(|(k, _)| *k == "limit" || *k == "offset") {
                return Err(ApiError::ReservedParam {
                    resource: api_resource.to_string(),
                    param: param.to_string(),
                });
            }
            if api_resource == "slo" {
                self.list_paginated(api_resource, params).await
            } else {
                self.list_page(api_resource, params).await
            }
        })
    }

    fn show<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(async move {
            let path = format!("/api/v1/{api_resource}/{id}");
            let response = self.request(Method::GET, &path, None, &[], false).await?;
            if api_resource == "slo" {
                take_field(response, "data", &path)
            } else {
                Ok(response)
            }
        })
    }

    fn create<'a>(
        &'a self,
        api_resource: &'a str,
        payload: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(async move {
            let path = format!("/api/v1/{api_resource}");
            let response = self
                .request(Method::POST, &path, Some(payload), &[], false)
                .await?;
            if api_resource != "slo" {
                return Ok(response);
            }
            // SLO creation replies with a list of one
            match take_field(response, "data", &path)? {
                Value::Array(items) => items.into_iter().next().ok_or(ApiError::UnexpectedResponse {
                    path,
                    detail: "empty data list".into(),
                }),
                other => Ok(other),
            }
        })
    }

    fn update<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
        payload: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(async move {
            let path = format!("/api/v1/{api_resource}/{id}");
            self.request(Method::PUT, &path, Some(payload), &[], false)
                .await
        })
    }

    // force=true so dependent monitors and SLOs do not block the delete.
    fn delete<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            let path = format!("/api/v1/{api_resource}/{id}");
            self.request(Method::DELETE, &path, None, &[("force", "true")], true)
                .await?;
            Ok(())
        })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

fn take_field(response: Value, field: &str, path: &str) -> Result<Value, ApiError> {
    match response {
        Value::Object(mut map) => map.remove(field).ok_or_else(|| ApiError::UnexpectedResponse {
            path: path.to_string(),
            detail: format!("missing `{field}`"),
        }),
        other => Err(ApiError::UnexpectedResponse {
            path: path.to_string(),
            detail: format!("expected an object with `{field}`, got {other}"),
        }),
    }
}

fn request_error(
    method: &Method,
    path: &str,
    body: Option<&Value>,
    status: Option<StatusCode>,
    response: String,
) -> RequestError {
    RequestError {
        method: method.to_string(),
        path: path.to_string(),
        request: body.map(|b| serde_json::to_string_pretty(b).unwrap_or_else(|_| b.to_string())),
        status: status.map(|s| s.as_u16()),
        response,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn api() -> Api {
        Api::new(ApiConfig::new("key", "app").with_base_url("http://localhost:1/")).unwrap()
    }

    #[test]
    fn url_encodes_params() {
        let url = api().url("/api/v1/slo", &[("limit", "1000"), ("offset", "0")]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1/api/v1/slo?limit=1000&offset=0");
    }

    #[test]
    fn url_without_params_has_no_query() {
        let url = api().url("/api/v1/monitor/12", &[]).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn take_field_unwraps_wrapper() {
        let value = take_field(json!({"data": [1, 2]}), "data", "/p").unwrap();
        assert_eq!(value, json!([1, 2]));
        assert!(matches!(
            take_field(json!({"other": 1}), "data", "/p"),
            Err(ApiError::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn request_error_message_carries_bodies() {
        let err = request_error(
            &Method::POST,
            "/api/v1/monitor",
            Some(&json!({"name": "x"})),
            Some(StatusCode::BAD_REQUEST),
            "{\"errors\":[\"bad\"]}".into(),
        );
        let message = err.to_string();
        assert!(message.starts_with("Error 400 during POST /api/v1/monitor"));
        assert!(message.contains("\"name\": \"x\""));
        assert!(message.ends_with("{\"errors\":[\"bad\"]}"));
    }
}
