//! Document library management.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;

pub struct Libraries<'a> {
    client: &'a Mistral,
}

impl<'a> Libraries<'a> {
    pub(crate) fn new(client: &'a Mistral) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::POST, "/v1/libraries", Some(&params), options)
            .await
    }

    pub async fn list(&self, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(Method::GET, "/v1/libraries", None, options)
            .await
    }

    pub async fn retrieve(&self, library_id: &str, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(
                Method::GET,
                &format!("/v1/libraries/{library_id}"),
                None,
                options,
            )
            .await
    }

    pub async fn update(
        &self,
        library_id: &str,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::PUT,
                &format!("/v1/libraries/{library_id}"),
                Some(&params),
                options,
            )
            .await
    }

    pub async fn delete(&self, library_id: &str, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(
                Method::DELETE,
                &format!("/v1/libraries/{library_id}"),
                None,
                options,
            )
            .await
    }
}
