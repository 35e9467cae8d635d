//! Model listing and retrieval.

use reqwest::Method;
use serde_json::Value;

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;

pub struct Models<'a> {
    client: &'a Mistral,
}

impl<'a> Models<'a> {
    pub(crate) fn new(client: &'a Mistral) -> Self {
        Self { client }
    }

    /// List all models available to the account.
    pub async fn list(&self, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(Method::GET, "/v1/models", None, options)
            .await
    }

    /// Retrieve one model by id.
    pub async fn retrieve(&self, model_id: &str, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(Method::GET, &format!("/v1/models/{model_id}"), None, options)
            .await
    }
}
