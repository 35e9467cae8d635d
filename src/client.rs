//! The dispatcher: resolves configuration, sends requests and decodes
//! responses. Resource modules under [`crate::api`] delegate everything here.

use std::time::Duration;

use futures::TryStreamExt;
use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::config::{CallOptions, EffectiveConfig, HttpOptions, resolve};
use crate::error::{BoxError, Error};
use crate::multipart;
use crate::request::{self, OutgoingRequest, RequestBody};
use crate::sse::EventStream;

/// Client handle for the platform API.
///
/// Holds only the HTTP transport; all connection and auth settings are
/// resolved per call from [`CallOptions`], the process defaults and the
/// environment, so concurrent calls share nothing mutable.
pub struct Mistral {
    http: reqwest::Client,
}

fn request_timeout(options: &HttpOptions) -> Option<Duration> {
    options
        .get("timeout_ms")
        .and_then(Value::as_u64)
        .map(Duration::from_millis)
}

impl Mistral {
    /// Create a client. Fails only if the underlying transport cannot be
    /// constructed.
    pub fn new() -> Result<Self, Error> {
        let user_agent = format!("mistral-client/{}", env!("CARGO_PKG_VERSION"));
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    async fn execute(
        &self,
        config: &EffectiveConfig,
        request: OutgoingRequest,
    ) -> Result<reqwest::Response, Error> {
        let mut builder = self.http.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(body) => builder.body(body.to_bytes()),
        };
        if let Some(timeout) = request_timeout(&config.http_options) {
            builder = builder.timeout(timeout);
        }
        builder
            .send()
            .await
            .map_err(|e| Error::network("request failed", e))
    }

    /// Issue a request and decode the complete response body.
    ///
    /// 2xx responses are decoded as JSON; a 2xx body that is not JSON (e.g.
    /// plain-text content endpoints) is wrapped as `{"content": <raw text>}`.
    /// 4xx/5xx responses become [`Error::Api`] with the body preserved
    /// verbatim.
    #[tracing::instrument(
        name = "api_request",
        skip(self, params, options),
        fields(method = %method, path = %path),
        err
    )]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&Map<String, Value>>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        let config = resolve(options)?;
        let request = request::build(&config, method, path, params, None)?;
        let response = self.execute(&config, request).await?;
        decode_response(response).await
    }

    /// Issue a streaming request and hand back the lazy event sequence.
    ///
    /// The stream is returned as soon as response headers indicate success;
    /// an error status is read synchronously and reported before any
    /// streaming begins. Once iteration starts, mid-stream failures surface
    /// as terminal `Network`/`Decode` items on the sequence.
    #[tracing::instrument(
        name = "api_stream",
        skip(self, params, options),
        fields(method = %method, path = %path),
        err
    )]
    pub async fn request_stream(
        &self,
        method: Method,
        path: &str,
        params: Option<&Map<String, Value>>,
        options: &CallOptions,
    ) -> Result<EventStream, Error> {
        let config = resolve(options)?;
        let request = request::build(&config, method, path, params, None)?;
        let response = self.execute(&config, request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "streaming request rejected");
            let body = response
                .text()
                .await
                .map_err(|e| Error::network("failed to read error body", e))?;
            return Err(Error::Api {
                status_code: status.as_u16(),
                body,
            });
        }

        debug!(status = %status, "stream established");
        let bytes = response.bytes_stream().map_err(|e| Box::new(e) as BoxError);
        Ok(EventStream::new(bytes))
    }

    /// Upload a file as a multipart POST, with `extra_params` as additional
    /// form fields.
    #[tracing::instrument(
        name = "api_upload",
        skip(self, extra_params, options),
        fields(path = %path, file = %file_path),
        err
    )]
    pub async fn upload(
        &self,
        path: &str,
        file_path: &str,
        field_name: &str,
        filename: Option<String>,
        extra_params: &Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        let config = resolve(options)?;
        let body = multipart::encode(file_path, field_name, filename, extra_params).await?;
        let request = request::build(&config, Method::POST, path, None, Some(body))?;
        let response = self.execute(&config, request).await?;
        decode_response(response).await
    }
}

async fn decode_response(response: reqwest::Response) -> Result<Value, Error> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::network("failed to read response body", e))?;

    if !status.is_success() {
        warn!(status = %status, "API returned error status");
        return Err(Error::Api {
            status_code: status.as_u16(),
            body: text,
        });
    }

    debug!(status = %status, "request successful");
    Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "content": text })))
}
