//! Server-side conversations: start, append, inspect history.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;
use crate::sse::EventStream;

pub struct Conversations<'a> {
    client: &'a Mistral,
}

impl<'a> Conversations<'a> {
    pub(crate) fn new(client: &'a Mistral) -> Self {
        Self { client }
    }

    /// Start a new conversation and wait for the first response.
    pub async fn start(
        &self,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::POST, "/v1/conversations", Some(&params), options)
            .await
    }

    /// Streamed variant of [`Conversations::start`].
    pub async fn start_stream(
        &self,
        mut params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<EventStream, Error> {
        super::force_stream_flag(&mut params);
        self.client
            .request_stream(Method::POST, "/v1/conversations", Some(&params), options)
            .await
    }

    pub async fn list(
        &self,
        params: Option<&Map<String, Value>>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::GET, "/v1/conversations", params, options)
            .await
    }

    pub async fn retrieve(
        &self,
        conversation_id: &str,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::GET,
                &format!("/v1/conversations/{conversation_id}"),
                None,
                options,
            )
            .await
    }

    /// Append entries to an existing conversation.
    pub async fn append(
        &self,
        conversation_id: &str,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::POST,
                &format!("/v1/conversations/{conversation_id}"),
                Some(&params),
                options,
            )
            .await
    }

    /// Streamed variant of [`Conversations::append`].
    pub async fn append_stream(
        &self,
        conversation_id: &str,
        mut params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<EventStream, Error> {
        super::force_stream_flag(&mut params);
        self.client
            .request_stream(
                Method::POST,
                &format!("/v1/conversations/{conversation_id}"),
                Some(&params),
                options,
            )
            .await
    }

    /// Full entry history of a conversation.
    pub async fn history(
        &self,
        conversation_id: &str,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::GET,
                &format!("/v1/conversations/{conversation_id}/history"),
                None,
                options,
            )
            .await
    }
}
