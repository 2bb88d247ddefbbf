//! Marathon application descriptor synthesis.
//!
//! Pure functions only — template loading lives in the application layer.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::error::DriverError;

/// Number of instances every test app is launched with.
pub const APP_INSTANCES: u64 = 1;

static APP_ID_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(([a-z0-9]|[a-z0-9][a-z0-9\-]*[a-z0-9])\.)*([a-z0-9]|[a-z0-9][a-z0-9\-]*[a-z0-9])$")
        .ok()
});

/// JSON request body for `POST /v2/apps`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AppDescriptor(Map<String, Value>);

impl AppDescriptor {
    /// Layer `template`, then `overrides`, then the required fields.
    ///
    /// `id` and `instances` always end up as `app_id` and `1`.
    #[must_use]
    pub fn build(template: Option<Map<String, Value>>, overrides: &Map<String, Value>, app_id: &str) -> Self {
        let mut merged = Value::Object(template.unwrap_or_default());
        deep_merge(&mut merged, Value::Object(overrides.clone()));

        let mut required = Map::new();
        required.insert("id".to_string(), Value::from(app_id));
        required.insert("instances".to_string(), Value::from(APP_INSTANCES));
        deep_merge(&mut merged, Value::Object(required));

        match merged {
            Value::Object(map) => Self(map),
            _ => Self(Map::new()),
        }
    }

    /// The app id carried by the descriptor.
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key, arrays gain the overlay elements they do not
/// already contain, and any other value is replaced by the overlay.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        dst.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(dst), Value::Array(src)) => {
            for value in src {
                if !dst.contains(&value) {
                    dst.push(value);
                }
            }
        }
        (dst, src) => *dst = src,
    }
}

/// Generate a unique Marathon app id.
///
/// Format: `<prefix>/<base>-<32 hex chars>`, lower-cased, with underscores
/// replaced by hyphens. No separator is added when the prefix is empty or
/// already ends with `/`.
///
/// # Errors
///
/// Returns [`DriverError::InvalidAppId`] if the result is not a valid
/// Marathon path.
pub fn generate_app_id(prefix: &str, base: &str) -> Result<String, DriverError> {
    let separator = if prefix.is_empty() || prefix.ends_with('/') {
        ""
    } else {
        "/"
    };
    let id = format!("{prefix}{separator}{base}-{}", random_hex())
        .to_ascii_lowercase()
        .replace('_', "-");
    validate_app_id(&id)?;
    Ok(id)
}

/// Validates an app id against Marathon's path grammar.
///
/// # Errors
///
/// Returns [`DriverError::InvalidAppId`] if any path segment is malformed.
pub fn validate_app_id(id: &str) -> Result<(), DriverError> {
    let Some(segment) = APP_ID_SEGMENT.as_ref() else {
        return Err(DriverError::InvalidAppId(id.to_string()));
    };
    let trimmed = id.strip_prefix('/').unwrap_or(id);
    if trimmed.is_empty() || !trimmed.split('/').all(|s| segment.is_match(s)) {
        return Err(DriverError::InvalidAppId(id.to_string()));
    }
    Ok(())
}

/// 32 lowercase hex characters.
///
/// Entropy sources: nanosecond timestamp and independent `RandomState` hashes.
#[must_use]
pub fn random_hex() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let word = |salt: u64| {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u128(nanos);
        hasher.write_u64(salt);
        hasher.write_u64(RandomState::new().build_hasher().finish());
        hasher.finish()
    };
    format!("{:016x}{:016x}", word(0), word(1))
}
