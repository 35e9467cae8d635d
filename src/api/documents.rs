//! Documents within a library, including file upload.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::Mistral;
use crate::config::CallOptions;
use crate::error::Error;

pub struct Documents<'a> {
    client: &'a Mistral,
    library_id: String,
}

impl<'a> Documents<'a> {
    pub(crate) fn new(client: &'a Mistral, library_id: String) -> Self {
        Self { client, library_id }
    }

    fn base_path(&self) -> String {
        format!("/v1/libraries/{}/documents", self.library_id)
    }

    /// Upload a file into the library as a new document. `extra_params`
    /// become additional multipart form fields.
    pub async fn upload(
        &self,
        file_path: &str,
        filename: Option<String>,
        extra_params: &Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .upload(
                &self.base_path(),
                file_path,
                "file",
                filename,
                extra_params,
                options,
            )
            .await
    }

    pub async fn list(
        &self,
        params: Option<&Map<String, Value>>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(Method::GET, &self.base_path(), params, options)
            .await
    }

    pub async fn retrieve(&self, document_id: &str, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(
                Method::GET,
                &format!("{}/{document_id}", self.base_path()),
                None,
                options,
            )
            .await
    }

    pub async fn update(
        &self,
        document_id: &str,
        params: Map<String, Value>,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::PUT,
                &format!("{}/{document_id}", self.base_path()),
                Some(&params),
                options,
            )
            .await
    }

    pub async fn delete(&self, document_id: &str, options: &CallOptions) -> Result<Value, Error> {
        self.client
            .request(
                Method::DELETE,
                &format!("{}/{document_id}", self.base_path()),
                None,
                options,
            )
            .await
    }

    /// Extracted text of a processed document. The endpoint answers plain
    /// text, which the dispatcher wraps as `{"content": <text>}`.
    pub async fn text_content(
        &self,
        document_id: &str,
        options: &CallOptions,
    ) -> Result<Value, Error> {
        self.client
            .request(
                Method::GET,
                &format!("{}/{document_id}/text_content", self.base_path()),
                None,
                options,
            )
            .await
    }
}
