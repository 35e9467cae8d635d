//! Per-resource API surfaces.
//!
//! Each accessor borrows the client, builds the endpoint path and delegates
//! to the dispatcher; results and errors are passed through untouched.

mod agents;
mod chat;
mod conversations;
mod documents;
mod embeddings;
mod libraries;
mod models;

pub use agents::Agents;
pub use chat::Chat;
pub use conversations::Conversations;
pub use documents::Documents;
pub use embeddings::Embeddings;
pub use libraries::Libraries;
pub use models::Models;

use crate::client::Mistral;

impl Mistral {
    pub fn models(&self) -> Models<'_> {
        Models::new(self)
    }

    pub fn chat(&self) -> Chat<'_> {
        Chat::new(self)
    }

    pub fn agents(&self) -> Agents<'_> {
        Agents::new(self)
    }

    pub fn embeddings(&self) -> Embeddings<'_> {
        Embeddings::new(self)
    }

    pub fn libraries(&self) -> Libraries<'_> {
        Libraries::new(self)
    }

    /// Documents live under a library; the accessor is scoped to one.
    pub fn documents(&self, library_id: impl Into<String>) -> Documents<'_> {
        Documents::new(self, library_id.into())
    }

    pub fn conversations(&self) -> Conversations<'_> {
        Conversations::new(self)
    }
}

/// Force `"stream": true` into a completion payload. The server keys
/// streaming delivery on this field, so the streaming entry points set it
/// unconditionally.
pub(crate) fn force_stream_flag(
    params: &mut serde_json::Map<String, serde_json::Value>,
) {
    params.insert("stream".to_string(), serde_json::Value::Bool(true));
}
