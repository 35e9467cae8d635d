//! Configuration resolution.
//!
//! Every call resolves an immutable [`EffectiveConfig`] from three precedence
//! levels: explicit per-call options, process-wide defaults set once at
//! startup via [`configure`], and the `MISTRAL_API_KEY` environment variable.
//! Each field is resolved independently, so a caller may override only the
//! API key while inheriting the default base URL.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::error::Error;

/// Default endpoint of the hosted platform.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Environment variable consulted as the lowest-precedence credential source.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Transport tuning options as a dynamic string-keyed map.
///
/// Recognized keys: `timeout_ms` (number, whole-request timeout in
/// milliseconds) and `headers` (object of extra request headers). Unknown
/// keys are carried along but ignored by the dispatcher.
pub type HttpOptions = Map<String, Value>;

/// Per-call overrides. All fields optional; anything unset falls through to
/// the process defaults and then the built-in fallbacks.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub http_options: Option<HttpOptions>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn http_options(mut self, options: HttpOptions) -> Self {
        self.http_options = Some(options);
        self
    }
}

/// Process-wide defaults, frozen after the first [`configure`] call.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub http_options: Option<HttpOptions>,
}

static DEFAULTS: OnceLock<Defaults> = OnceLock::new();

/// Install process-wide defaults. May be called at most once, before any
/// requests are issued; a second call is rejected so resolved configuration
/// stays stable for the lifetime of the process.
pub fn configure(defaults: Defaults) -> Result<(), Error> {
    DEFAULTS
        .set(defaults)
        .map_err(|_| Error::Configuration("defaults already configured".to_string()))
}

fn defaults() -> &'static Defaults {
    static EMPTY: Defaults = Defaults {
        api_key: None,
        base_url: None,
        http_options: None,
    };
    DEFAULTS.get().unwrap_or(&EMPTY)
}

/// Fully resolved settings for one request. Constructed fresh per call and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub api_key: String,
    pub base_url: String,
    pub http_options: HttpOptions,
}

/// Merge `explicit` over `base`, one level deep. Explicit keys win; base keys
/// without an explicit counterpart survive.
fn shallow_merge(base: Option<&HttpOptions>, explicit: Option<&HttpOptions>) -> HttpOptions {
    let mut merged = base.cloned().unwrap_or_default();
    if let Some(explicit) = explicit {
        for (key, value) in explicit {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Empty strings count as absent so a blank env var cannot mask a configured
/// default.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolve the effective configuration for one call.
///
/// The only environment read is [`API_KEY_ENV`]; everything else comes from
/// the arguments and the frozen startup defaults, so resolution is
/// deterministic for a given process state.
pub fn resolve(options: &CallOptions) -> Result<EffectiveConfig, Error> {
    let defaults = defaults();

    let env_key = std::env::var(API_KEY_ENV).ok();
    let api_key = non_empty(options.api_key.as_deref())
        .or_else(|| non_empty(defaults.api_key.as_deref()))
        .or_else(|| non_empty(env_key.as_deref()))
        .ok_or_else(|| {
            Error::Configuration(format!(
                "no API key: pass one explicitly, configure a default, or set {API_KEY_ENV}"
            ))
        })?
        .to_string();

    let base_url = non_empty(options.base_url.as_deref())
        .or_else(|| non_empty(defaults.base_url.as_deref()))
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string();

    let http_options = shallow_merge(
        defaults.http_options.as_ref(),
        options.http_options.as_ref(),
    );

    Ok(EffectiveConfig {
        api_key,
        base_url,
        http_options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Mutex, MutexGuard};

    // Tests that touch MISTRAL_API_KEY serialize on this lock so parallel
    // execution cannot interleave set/remove calls.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn options_map(pairs: &[(&str, Value)]) -> HttpOptions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn explicit_key_wins() {
        let options = CallOptions::new().api_key("explicit-key");
        let config = resolve(&options).expect("config");
        assert_eq!(config.api_key, "explicit-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_key_everywhere_is_a_configuration_error() {
        // Process defaults are unset in this test binary and the env var is
        // cleared here; resolution must fail fast rather than build a request
        // with an empty credential.
        let _guard = env_guard();
        unsafe { std::env::remove_var(API_KEY_ENV) };
        let result = resolve(&CallOptions::new());
        match result {
            Err(Error::Configuration(message)) => {
                assert!(message.contains(API_KEY_ENV), "got: {message}")
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn empty_explicit_key_falls_through() {
        let _guard = env_guard();
        unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
        let options = CallOptions::new().api_key("");
        let config = resolve(&options).expect("config");
        assert_eq!(config.api_key, "env-key");
        unsafe { std::env::remove_var(API_KEY_ENV) };
    }

    #[test]
    fn base_url_override_does_not_touch_api_key() {
        let options = CallOptions::new()
            .api_key("key")
            .base_url("http://localhost:8080");
        let config = resolve(&options).expect("config");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.api_key, "key");
    }

    #[test]
    fn http_options_shallow_merge() {
        let base = options_map(&[("a", json!(2)), ("b", json!(3))]);
        let explicit = options_map(&[("a", json!(1))]);
        let merged = shallow_merge(Some(&base), Some(&explicit));
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!(3)));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn http_options_merge_with_no_defaults() {
        let explicit = options_map(&[("timeout_ms", json!(5000))]);
        let merged = shallow_merge(None, Some(&explicit));
        assert_eq!(merged.get("timeout_ms"), Some(&json!(5000)));
    }
}
