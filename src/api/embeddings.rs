//! Embedding computation.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;

pub struct Embeddings<'a> {
    client: &'a Mistral,
}

impl<'a> Embeddings<'a> {
    pub(crate) fn new(client: &'a Mistral) -> Self {
        Self { client }
    }

    /// Compute embeddings for the inputs in `params` (`model`, `input`).
    pub async fn create(
        &self,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::POST, "/v1/embeddings", Some(&params), options)
            .await
    }
}
