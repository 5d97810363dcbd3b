//! Backend configuration read from the environment.
//!
//! Every variable has a default except the backend URL, which is only needed
//! when a payload is actually sent.

use std::time::Duration;

use photo_canvas::consts::BACKEND_MASK_SIZE;
use photo_canvas::raster::PixelSize;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const URL_VAR: &str = "PHOTOMASK_BACKEND_URL";
const REQUEST_TIMEOUT_VAR: &str = "PHOTOMASK_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "PHOTOMASK_CONNECT_TIMEOUT_SECS";
const MASK_SIZE_VAR: &str = "PHOTOMASK_MASK_SIZE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got {value:?}")]
    BadUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl BackendTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash; `None` when unset.
    pub base_url: Option<String>,
    pub timeouts: BackendTimeouts,
    /// Square size every mask and image is stretched to before sending.
    pub mask_size: PixelSize,
}

impl BackendConfig {
    /// Read the backend settings.
    ///
    /// - `PHOTOMASK_BACKEND_URL`: edit service base URL (optional)
    /// - `PHOTOMASK_REQUEST_TIMEOUT_SECS`: whole-request timeout, default 120
    /// - `PHOTOMASK_CONNECT_TIMEOUT_SECS`: connect timeout, default 10
    /// - `PHOTOMASK_MASK_SIZE`: square mask edge in pixels, default 512
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but does not parse, or if the URL
    /// is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = match std::env::var(URL_VAR) {
            Ok(raw) if !raw.trim().is_empty() => Some(normalize_url(&raw)?),
            _ => None,
        };
        let request_secs = env_parse(REQUEST_TIMEOUT_VAR, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let connect_secs = env_parse(CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT_SECS)?;
        let edge: u32 = env_parse(MASK_SIZE_VAR, BACKEND_MASK_SIZE)?;
        if edge == 0 {
            return Err(ConfigError::Invalid { var: MASK_SIZE_VAR, value: edge.to_string() });
        }

        Ok(Self {
            base_url,
            timeouts: BackendTimeouts { request_secs, connect_secs },
            mask_size: PixelSize::new(edge, edge),
        })
    }
}

fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::BadUrl { var: URL_VAR, value: raw.to_owned() })
    }
}

/// Parse `key` when set; unset falls back to `default`, a bad value is an error.
fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
