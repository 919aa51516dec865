//! Connection configuration for an openHAB hub

use std::fmt;

use serde::Deserialize;

/// Public cloud hub, the only base URL whose trailing slash is stripped
pub const MYOPENHAB_URL: &str = "https://myopenhab.org";

/// Base URL and optional credentials for an openHAB hub
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    #[serde(rename = "url")]
    base_url: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl ConnectionConfig {
    /// Create an unauthenticated config for the given base URL
    ///
    /// `https://myopenhab.org/` is normalized to `https://myopenhab.org`;
    /// any other URL is kept as given.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            username: None,
            password: None,
        }
    }

    /// Attach basic-auth credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Attach credentials where either part may be missing
    ///
    /// Authentication is only used when both are present.
    pub fn with_optional_credentials(
        mut self,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Username and password, only if both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    /// Re-apply base URL normalization after deserialization
    pub(crate) fn normalized(mut self) -> Self {
        self.base_url = normalize_base_url(self.base_url);
        self
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

fn normalize_base_url(url: String) -> String {
    if url == "https://myopenhab.org/" {
        MYOPENHAB_URL.to_string()
    } else {
        url
    }
}
