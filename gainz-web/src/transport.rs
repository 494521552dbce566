//! Fire-and-forget `fetch` requests.
//!
//! Requests are spawned on the browser event loop and the caller returns
//! immediately. Failures after dispatch are only logged.

use gainz_core::TelemetryTransport;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Request, RequestInit, Response};

use crate::dom;
use crate::paths::{TELEMETRY_ENDPOINT, api_path};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no browser window")]
    NoWindow,
    #[error("request could not be built: {0}")]
    Request(String),
}

impl From<JsValue> for TransportError {
    fn from(value: JsValue) -> Self {
        Self::Request(dom::js_error_message(&value))
    }
}

/// Start a request without waiting for it.
///
/// # Errors
/// Returns an error if no window exists or the request cannot be constructed.
pub fn dispatch(method: &str, url: &str, json_body: Option<&str>) -> Result<(), TransportError> {
    let window = dom::window().ok_or(TransportError::NoWindow)?;

    let init = RequestInit::new();
    init.set_method(method);
    if let Some(body) = json_body {
        init.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(url, &init)?;
    if json_body.is_some() {
        request.headers().set("Content-Type", "application/json")?;
    }

    let pending = JsFuture::from(window.fetch_with_request(&request));
    let label = format!("{method} {url}");
    spawn_local(async move {
        match pending.await {
            Ok(value) => match value.dyn_into::<Response>() {
                Ok(response) if !response.ok() => {
                    log::warn!("{label} answered {}", response.status());
                }
                Ok(_) => log::debug!("{label} delivered"),
                Err(other) => log::warn!("{label} returned {}", dom::js_error_message(&other)),
            },
            Err(err) => log::warn!("{label} failed: {}", dom::js_error_message(&err)),
        }
    });
    Ok(())
}

/// POSTs telemetry payloads as JSON.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new(api_path(TELEMETRY_ENDPOINT))
    }
}

impl TelemetryTransport for FetchTransport {
    type Error = TransportError;

    fn submit(&self, payload: String) -> Result<(), Self::Error> {
        dispatch("POST", &self.endpoint, Some(&payload))
    }
}
