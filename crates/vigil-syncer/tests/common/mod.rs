//! In-memory stand-in for the remote service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use vigil_api::{ApiError, BoxFuture, Remote};
use vigil_core::RemoteId;

pub const BASE_URL: &str = "https://app.example.com";

#[derive(Default)]
pub struct FakeRemote {
    store: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<Vec<String>>,
    /// Payloads received by `create`, in call order.
    created: Mutex<Vec<(String, Value)>>,
    next_id: Mutex<i64>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Self::default()
        }
    }

    /// Seed a live resource.
    pub fn with(self, api_resource: &str, payload: Value) -> Self {
        self.store
            .lock()
            .unwrap()
            .entry(api_resource.to_string())
            .or_default()
            .push(payload);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than list/show.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list") && !c.starts_with("show"))
            .collect()
    }

    pub fn created(&self) -> Vec<(String, Value)> {
        self.created.lock().unwrap().clone()
    }

    pub fn items(&self, api_resource: &str) -> Vec<Value> {
        self.store
            .lock()
            .unwrap()
            .get(api_resource)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn assign_id(&self, api_resource: &str) -> RemoteId {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        if api_resource == "monitor" {
            RemoteId::Int(*next)
        } else {
            RemoteId::Str(format!("{api_resource}-{next}"))
        }
    }

    fn not_found(method: &str, api_resource: &str, id: &RemoteId) -> ApiError {
        ApiError::Request(vigil_api::RequestError {
            method: method.to_string(),
            path: format!("/api/v1/{api_resource}/{id}"),
            request: None,
            status: Some(404),
            response: "not found".into(),
        })
    }
}

impl Remote for FakeRemote {
    fn list<'a>(
        &'a self,
        api_resource: &'a str,
        _params: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, Result<Vec<Value>, ApiError>> {
        Box::pin(async move {
            self.record(format!("list {api_resource}"));
            let mut items = self.items(api_resource);
            // Dashboard lists leave out widgets, like the real service.
            if api_resource == "dashboard" {
                for item in &mut items {
                    if let Value::Object(map) = item {
                        map.remove("widgets");
                    }
                }
            }
            Ok(items)
        })
    }

    fn show<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(async move {
            self.record(format!("show {api_resource} {id}"));
            self.items(api_resource)
                .into_iter()
                .find(|item| RemoteId::of(item).as_ref() == Some(id))
                .ok_or_else(|| Self::not_found("GET", api_resource, id))
        })
    }

    fn create<'a>(
        &'a self,
        api_resource: &'a str,
        payload: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(async move {
            let id = self.assign_id(api_resource);
            self.record(format!("create {api_resource} {id}"));
            self.created
                .lock()
                .unwrap()
                .push((api_resource.to_string(), payload.clone()));

            let mut stored = payload.clone();
            stored["id"] = id.to_value();
            self.store
                .lock()
                .unwrap()
                .entry(api_resource.to_string())
                .or_default()
                .push(stored.clone());
            Ok(stored)
        })
    }

    fn update<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
        payload: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        Box::pin(async move {
            self.record(format!("update {api_resource} {id}"));
            let mut store = self.store.lock().unwrap();
            let items = store.entry(api_resource.to_string()).or_default();
            let slot = items
                .iter_mut()
                .find(|item| RemoteId::of(item).as_ref() == Some(id))
                .ok_or_else(|| Self::not_found("PUT", api_resource, id))?;
            let mut stored = payload.clone();
            stored["id"] = id.to_value();
            *slot = stored.clone();
            Ok(stored)
        })
    }

    fn delete<'a>(
        &'a self,
        api_resource: &'a str,
        id: &'a RemoteId,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            self.record(format!("delete {api_resource} {id}"));
            if let Some(items) = self.store.lock().unwrap().get_mut(api_resource) {
                items.retain(|item| RemoteId::of(item).as_ref() != Some(id));
            }
            Ok(())
        })
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }
}
