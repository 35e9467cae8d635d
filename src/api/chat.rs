//! Chat completions, synchronous and streamed.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;
use crate::sse::EventStream;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub struct Chat<'a> {
    client: &'a Mistral,
}

impl<'a> Chat<'a> {
    pub(crate) fn new(client: &'a Mistral) -> Self {
        Self { client }
    }

    /// Run a chat completion and wait for the full response.
    ///
    /// `params` is the request payload as-is (`model`, `messages`,
    /// sampling settings, ...).
    pub async fn complete(
        &self,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::POST, COMPLETIONS_PATH, Some(&params), options)
            .await
    }

    /// Run a chat completion and consume it incrementally. `"stream": true`
    /// is set on the payload regardless of what the caller passed.
    pub async fn stream(
        &self,
        mut params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<EventStream, Error> {
        super::force_stream_flag(&mut params);
        self.client
            .request_stream(Method::POST, COMPLETIONS_PATH, Some(&params), options)
            .await
    }
}
