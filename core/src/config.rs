//! Base URL configuration.
//!
//! Each URL is resolved once at startup from, in order: the runtime
//! environment, the environment captured at build time, and a fixed default.
//! The first non-empty value wins.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8001/api";
pub const DEFAULT_STORAGE_BASE: &str = "http://127.0.0.1:8001/storage";

pub const API_BASE_VAR: &str = "PUBLIC_API_BASE";
pub const STORAGE_BASE_VAR: &str = "PUBLIC_STORAGE_BASE";

const BUILD_API_BASE: Option<&str> = option_env!("VITE_API_BASE");
const BUILD_STORAGE_BASE: Option<&str> = option_env!("VITE_STORAGE_BASE");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub storage_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            storage_base_url: DEFAULT_STORAGE_BASE.to_string(),
        }
    }
}

impl Config {
    /// Resolve from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve with `runtime` standing in for the process environment.
    pub fn resolve(runtime: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base_url: first_non_empty(
                runtime(API_BASE_VAR).as_deref(),
                BUILD_API_BASE,
                DEFAULT_API_BASE,
            ),
            storage_base_url: first_non_empty(
                runtime(STORAGE_BASE_VAR).as_deref(),
                BUILD_STORAGE_BASE,
                DEFAULT_STORAGE_BASE,
            ),
        }
    }

    /// Public URL for a stored asset path as the backend reports it.
    ///
    /// Absolute `http(s)://` URLs pass through; relative paths are joined to
    /// the storage host with any trailing `/api` removed.
    pub fn storage_url(&self, path: Option<&str>) -> String {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return String::new();
        };
        let lowered = path.get(..8).unwrap_or(path).to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return path.to_string();
        }
        let host = self.storage_base_url.trim_end_matches('/');
        let host = host.strip_suffix("/api").unwrap_or(host);
        format!("{host}/{}", path.trim_start_matches('/'))
    }
}

fn first_non_empty(runtime: Option<&str>, build: Option<&str>, default: &str) -> String {
    [runtime, build]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}
