//! Agent management and agent completions.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;
use crate::sse::EventStream;

const COMPLETIONS_PATH: &str = "/v1/agents/completions";

pub struct Agents<'a> {
    client: &'a Mistral,
}

impl<'a> Agents<'a> {
    pub(crate) fn new(client: &'a Mistral) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::POST, "/v1/agents", Some(&params), options)
            .await
    }

    pub async fn list(&self, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(Method::GET, "/v1/agents", None, options)
            .await
    }

    pub async fn retrieve(&self, agent_id: &str, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(Method::GET, &format!("/v1/agents/{agent_id}"), None, options)
            .await
    }

    pub async fn update(
        &self,
        agent_id: &str,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::PATCH,
                &format!("/v1/agents/{agent_id}"),
                Some(&params),
                options,
            )
            .await
    }

    /// Run a completion against a stored agent (`agent_id` goes in the
    /// payload, not the path).
    pub async fn complete(
        &self,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::POST, COMPLETIONS_PATH, Some(&params), options)
            .await
    }

    /// Streamed variant of [`Agents::complete`].
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
