//! Building fully specified requests from a resolved configuration.

use reqwest::{Method, Url};
use serde_json::{Map, Value};

use crate::config::EffectiveConfig;
use crate::error::Error;
use crate::multipart::MultipartBody;

/// Request payload, fixed at build time.
#[derive(Debug)]
pub enum RequestBody {
    None,
    Json(Value),
    Multipart(MultipartBody),
}

/// A request ready to hand to the transport. Built fresh per call, never
/// mutated afterwards, consumed exactly once.
#[derive(Debug)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

/// Query-string value rendering: strings go verbatim, everything else in its
/// JSON text form.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn append_query(url: &mut Url, params: &Map<String, Value>) {
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            match value {
                // Absent values are omitted entirely.
                Value::Null => {}
                // Lists are repeated-key encoded.
                Value::Array(items) => {
                    for item in items {
                        pairs.append_pair(key, &query_value(item));
                    }
                }
                other => {
                    pairs.append_pair(key, &query_value(other));
                }
            }
        }
    }
    // All-null params must not leave a dangling "?".
    if url.query() == Some("") {
        url.set_query(None);
    }
}

/// Build an [`OutgoingRequest`] for the given operation.
///
/// GET/DELETE serialize `params` into the query string; other methods carry
/// them as a JSON object body unless a multipart body is supplied. Extra
/// headers from `http_options["headers"]` are merged in but can never
/// override `Authorization` or `Content-Type`.
pub fn build(
    config: &EffectiveConfig,
    method: Method,
    path: &str,
    params: Option<&Map<String, Value>>,
    multipart: Option<MultipartBody>,
) -> Result<OutgoingRequest, Error> {
    if config.api_key.is_empty() {
        return Err(Error::Configuration("API key is empty".to_string()));
    }
    if path.is_empty() {
        return Err(Error::Configuration("request path is empty".to_string()));
    }

    let mut url = Url::parse(&format!("{}{}", config.base_url, path)).map_err(|e| {
        Error::Configuration(format!(
            "invalid URL from base {:?} and path {:?}: {e}",
            config.base_url, path
        ))
    })?;

    let is_query_method = method == Method::GET || method == Method::DELETE;

    let body = if let Some(multipart) = multipart {
        RequestBody::Multipart(multipart)
    } else if is_query_method {
        if let Some(params) = params {
            append_query(&mut url, params);
        }
        RequestBody::None
    } else if let Some(params) = params {
        RequestBody::Json(Value::Object(params.clone()))
    } else {
        RequestBody::None
    };

    let mut headers = vec![(
        "Authorization".to_string(),
        format!("Bearer {}", config.api_key),
    )];
    match &body {
        RequestBody::Json(_) => headers.push((
            "Content-Type".to_string(),
            "application/json".to_string(),
        )),
        RequestBody::Multipart(multipart) => headers.push((
            "Content-Type".to_string(),
            format!("multipart/form-data; boundary={}", multipart.boundary),
        )),
        RequestBody::None => {}
    }

    if let Some(Value::Object(extra)) = config.http_options.get("headers") {
        for (name, value) in extra {
            if name.eq_ignore_ascii_case("authorization")
                || name.eq_ignore_ascii_case("content-type")
            {
                continue;
            }
            if let Value::String(value) = value {
                headers.push((name.clone(), value.clone()));
            }
        }
    }

    Ok(OutgoingRequest {
        method,
        url,
        headers,
        body,
    })
}
