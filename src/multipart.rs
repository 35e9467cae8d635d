//! Multipart/form-data encoding for file uploads.
//!
//! The encoder reads the upload source fully into memory, appends any extra
//! form fields as `text/plain` parts, and renders the RFC 2046 wire format
//! with a pseudo-random boundary. If the generated boundary happens to occur
//! inside any part's bytes a fresh one is drawn, up to a bounded number of
//! attempts.

use std::path::Path;

use bytes::Bytes;
use rand::Rng;
use serde_json::{Map, Value};

use crate::error::Error;

const BOUNDARY_LEN: usize = 30;
const MAX_BOUNDARY_ATTEMPTS: usize = 5;

/// One part of a multipart body.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: String,
    pub content: Bytes,
}

/// A fully assembled multipart body. `parts` is never empty: the file part is
/// always present.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub parts: Vec<Part>,
}

impl MultipartBody {
    /// Render the body in wire format: CRLF line endings, one delimiter per
    /// part, closing delimiter at the end.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(b"\r\n");
            match &part.filename {
                Some(filename) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name)
                        .as_bytes(),
                ),
            }
            out.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
            out.extend_from_slice(&part.content);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
        Bytes::from(out)
    }
}

fn random_boundary() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    let tail: String = (0..BOUNDARY_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    format!("------------------------{tail}")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Pick a boundary that does not occur in any part's content. The draw is
/// retried a bounded number of times before giving up with an `Encode` error.
fn choose_boundary(parts: &[Part]) -> Result<String, Error> {
    for _ in 0..MAX_BOUNDARY_ATTEMPTS {
        let candidate = random_boundary();
        let collides = parts
            .iter()
            .any(|part| contains(&part.content, candidate.as_bytes()));
        if !collides {
            return Ok(candidate);
        }
    }
    Err(Error::Encode(format!(
        "could not generate a collision-free boundary in {MAX_BOUNDARY_ATTEMPTS} attempts"
    )))
}

/// Infer a content type from the file extension; unknown extensions fall back
/// to `application/octet-stream`.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn field_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a multipart body from a file on disk plus auxiliary form fields.
///
/// The file becomes the first part under `field_name`, with the filename
/// defaulting to the path's basename. Each entry of `extra_params` becomes a
/// `text/plain` part carrying the value's string form.
pub async fn encode(
    file_path: impl AsRef<Path>,
    field_name: &str,
    filename: Option<String>,
    extra_params: &Map<String, Value>,
) -> Result<MultipartBody, Error> {
    let path = file_path.as_ref();
    let content = tokio::fs::read(path).await.map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = filename.or_else(|| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
    });

    let mut parts = vec![Part {
        name: field_name.to_string(),
        filename,
        content_type: content_type_for(path).to_string(),
        content: Bytes::from(content),
    }];

    for (name, value) in extra_params {
        parts.push(Part {
            name: name.clone(),
            filename: None,
            content_type: "text/plain".to_string(),
            content: Bytes::from(field_to_string(value)),
        });
    }

    let boundary = choose_boundary(&parts)?;
    Ok(MultipartBody { boundary, parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn temp_file(content: &[u8], suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(content).expect("write");
        file.flush().expect("flush");
        file
    }

    #[tokio::test]
    async fn encodes_file_and_extra_fields() {
        let file = temp_file(b"hello world", ".txt");
        let mut extra = Map::new();
        extra.insert("purpose".to_string(), json!("fine-tune"));
        extra.insert("chunk_size".to_string(), json!(512));

        let body = encode(file.path(), "file", None, &extra).await.expect("body");

        assert_eq!(body.parts.len(), 3);
        assert_eq!(body.parts[0].name, "file");
        assert_eq!(body.parts[0].content_type, "text/plain");
        assert!(body.parts[0].filename.is_some());
        assert_eq!(&body.parts[0].content[..], b"hello world");
        assert_eq!(body.parts[1].name, "purpose");
        assert_eq!(&body.parts[1].content[..], b"fine-tune");
        assert_eq!(body.parts[2].name, "chunk_size");
        assert_eq!(&body.parts[2].content[..], b"512");

        let wire = body.to_bytes();
        let text = String::from_utf8_lossy(&wire);
        assert!(text.starts_with(&format!("--{}\r\n", body.boundary)));
        assert!(text.ends_with(&format!("--{}--\r\n", body.boundary)));
        assert!(text.contains("Content-Disposition: form-data; name=\"purpose\"\r\n"));
    }

    #[tokio::test]
    async fn empty_file_is_a_valid_part() {
        let file = temp_file(b"", ".bin");
        let body = encode(file.path(), "file", Some("empty.bin".to_string()), &Map::new())
            .await
            .expect("body");
        assert_eq!(body.parts.len(), 1);
        assert!(body.parts[0].content.is_empty());
        assert_eq!(body.parts[0].content_type, "application/octet-stream");
        assert_eq!(body.parts[0].filename.as_deref(), Some("empty.bin"));
    }

    #[tokio::test]
    async fn boundary_never_occurs_in_content() {
        // Run a few times; the boundary is random per call.
        for _ in 0..8 {
            let file = temp_file(&[0xABu8; 4096], ".bin");
            let body = encode(file.path(), "file", None, &Map::new()).await.expect("body");
            assert!(!contains(&body.parts[0].content, body.boundary.as_bytes()));
        }
    }

    #[tokio::test]
    async fn missing_file_reports_file_access() {
        let result = encode("/nonexistent/upload.pdf", "file", None, &Map::new()).await;
        match result {
            Err(Error::FileAccess { path, source }) => {
                assert_eq!(path, Path::new("/nonexistent/upload.pdf"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected FileAccess, got {other:?}"),
        }
    }

    #[test]
    fn content_type_table() {
        assert_eq!(content_type_for(Path::new("a.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a")), "application/octet-stream");
    }

    #[test]
    fn boundary_redraw_avoids_embedded_boundary() {
        // Content that contains a previously drawn boundary must still end up
        // with a boundary that does not occur in it.
        let parts = vec![Part {
            name: "file".to_string(),
            filename: None,
            content_type: "application/octet-stream".to_string(),
            content: Bytes::from(random_boundary()),
        }];
        let boundary = choose_boundary(&parts).expect("fresh boundary");
        assert!(!contains(&parts[0].content, boundary.as_bytes()));
    }
}
