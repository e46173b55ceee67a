//! Fetch request model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Path that selects the robots script and binary content handling.
pub const ROBOTS_TXT_PATH: &str = "/robots.txt";

/// A single page fetch through Splash.
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Target page URL.
    pub url: String,

    /// Raw `Cookie` header value forwarded to the target.
    #[serde(default)]
    pub cookies: String,

    /// Form fields; a non-empty set makes Splash submit them to the target.
    #[serde(default)]
    pub form_params: BTreeMap<String, String>,

    /// Extra request headers for the target.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = cookies.into();
        self
    }

    pub fn with_form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_params.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(BTreeMap::new).insert(name.into(), value.into());
        self
    }

    /// URL used as a cache or storage key: whitespace and trailing slashes trimmed.
    ///
    /// Object stores reject keys ending in `/`.
    pub fn storage_key(&self) -> &str {
        self.url.trim().trim_end_matches('/').trim()
    }

    /// Whether the target is a site's robots.txt.
    pub fn is_robots_txt(&self) -> bool {
        is_robots_txt(&self.url)
    }
}

/// True when `url` parses and its path is exactly `/robots.txt`.
pub fn is_robots_txt(url: &str) -> bool {
    url::Url::parse(url.trim()).map(|u| u.path() == ROBOTS_TXT_PATH).unwrap_or(false)
}
