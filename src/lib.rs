//! # mistral-client
//!
//! Async client for the Mistral AI platform API: model listing, chat and
//! agent completions (synchronous or incrementally streamed), embeddings,
//! document libraries and server-side conversations.
//!
//! Configuration is resolved per call from three levels — explicit
//! [`CallOptions`], process-wide [`Defaults`] installed once via
//! [`configure`], and the `MISTRAL_API_KEY` environment variable — so
//! concurrent calls share nothing mutable.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use mistral_client::{CallOptions, Mistral};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Mistral::new()?;
//!     let options = CallOptions::new(); // api key from MISTRAL_API_KEY
//!
//!     let params = json!({
//!         "model": "mistral-small-latest",
//!         "messages": [{"role": "user", "content": "Hello!"}],
//!     });
//!     let response = client
//!         .chat()
//!         .complete(params.as_object().unwrap().clone(), &options)
//!         .await?;
//!     println!("{}", response["choices"][0]["message"]["content"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! Streaming completions come back as a pull-based [`EventStream`]; each
//! item is one decoded JSON payload, and dropping the stream early closes
//! the connection.
//!
//! ```rust,no_run
//! # use mistral_client::{CallOptions, Mistral};
//! # use serde_json::json;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use futures::StreamExt;
//!
//! let client = Mistral::new()?;
//! let params = json!({
//!     "model": "mistral-small-latest",
//!     "messages": [{"role": "user", "content": "Tell me a story."}],
//! });
//! let mut stream = client
//!     .chat()
//!     .stream(params.as_object().unwrap().clone(), &CallOptions::new())
//!     .await?;
//! while let Some(event) = stream.next().await {
//!     let event = event?;
//!     print!("{}", event.payload["choices"][0]["delta"]["content"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod multipart;
pub mod request;
pub mod sse;

pub use client::Mistral;
pub use config::{CallOptions, Defaults, HttpOptions, configure};
pub use error::Error;
pub use sse::{EventStream, StreamEvent};
