//! Credentials profile stored on disk.
//!
//! # Design
//! - Flags and environment variables (already merged by the argument parser) take
//!   precedence over the profile file, which takes precedence over built-in defaults.
//! - A missing profile at the default location is normal; a missing explicit profile is an
//!   error.
//! - Secrets are never rendered by `Debug`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults::{DEFAULT_API_URL, PROFILE_RELATIVE_PATH};
use crate::error::{ConfigError, ConfigResult};

/// Contents of the JSON profile file.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClientProfile {
    /// API endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Basic-auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for ClientProfile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientProfile")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientProfile {
    /// Read a profile from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid profile document.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "profile.read",
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ProfileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit profile when given, otherwise the default one if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit profile is missing, or any existing profile is
    /// unreadable or malformed.
    pub fn discover(explicit: Option<&Path>, home: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let Some(path) = default_profile_path(home) else {
            return Ok(Self::default());
        };
        match Self::load(&path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no profile found; using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// Default profile location below `home`.
#[must_use]
pub fn default_profile_path(home: Option<&Path>) -> Option<PathBuf> {
    home.map(|home| home.join(PROFILE_RELATIVE_PATH))
}

/// Values supplied through flags or environment variables.
#[derive(Clone, Default)]
pub struct ProfileOverrides {
    /// API endpoint.
    pub api_url: Option<String>,
    /// Bearer token.
    pub token: Option<String>,
    /// Basic-auth user name.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
}

/// Authentication material attached to API calls.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`.
    Token(String),
    /// `Authorization: Basic ...`.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => formatter.write_str("Token(<redacted>)"),
            Self::Basic { username, .. } => formatter
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Effective client settings after merging every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    /// Base URL all resource paths are joined onto.
    pub api_url: Url,
    /// Credentials, if any source supplied them.
    pub credentials: Option<Credentials>,
}

impl ResolvedProfile {
    /// Merge overrides with a profile file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for an unparsable API URL or a user name
    /// without a password.
    pub fn resolve(overrides: ProfileOverrides, profile: ClientProfile) -> ConfigResult<Self> {
        let raw_url = non_empty(overrides.api_url)
            .or_else(|| non_empty(profile.api_url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;

        let token = non_empty(overrides.token).or_else(|| non_empty(profile.token));
        let username = non_empty(overrides.username).or_else(|| non_empty(profile.username));
        let password = non_empty(overrides.password).or_else(|| non_empty(profile.password));

        let credentials = match (token, username, password) {
            (Some(token), _, _) => Some(Credentials::Token(token)),
            (None, Some(username), Some(password)) => Some(Credentials::Basic { username, password }),
            (None, Some(_), None) => {
                return Err(ConfigError::InvalidField {
                    field: "password",
                    message: "a password is required when a username is given".to_string(),
                });
            }
            (None, None, _) => None,
        };

        Ok(Self {
            api_url,
            credentials,
        })
    }
}

/// Parse an API URL, forcing a trailing slash so relative joins keep the base path.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the input is not an absolute http(s) URL.
pub fn parse_api_url(input: &str) -> ConfigResult<Url> {
    let trimmed = input.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|err| ConfigError::InvalidField {
        field: "api-url",
        message: format!("'{trimmed}' is not a valid URL: {err}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field: "api-url",
            message: format!("'{trimmed}' must use http or https"),
        });
    }
    Ok(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence_over_profile() {
        let profile = ClientProfile {
            api_url: Some("https://profile.example/v6".into()),
            token: Some("profile-token".into()),
            ..ClientProfile::default()
        };
        let overrides = ProfileOverrides {
            token: Some("flag-token".into()),
            ..ProfileOverrides::default()
        };
        let resolved = ResolvedProfile::resolve(overrides, profile).expect("resolves");
        assert_eq!(resolved.api_url.as_str(), "https://profile.example/v6/");
        assert_eq!(resolved.credentials, Some(Credentials::Token("flag-token".into())));
    }

    #[test]
    fn falls_back_to_default_url_without_credentials() {
        let resolved = ResolvedProfile::resolve(ProfileOverrides::default(), ClientProfile::default())
            .expect("resolves");
        assert_eq!(resolved.api_url.as_str(), format!("{DEFAULT_API_URL}/"));
        assert!(resolved.credentials.is_none());
    }

    #[test]
    fn basic_auth_requires_password() {
        let overrides = ProfileOverrides {
            username: Some("ops".into()),
            ..ProfileOverrides::default()
        };
        let err = ResolvedProfile::resolve(overrides, ClientProfile::default())
            .expect_err("password missing");
        assert!(matches!(err, ConfigError::InvalidField { field: "password", .. }));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(parse_api_url("ftp://example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
        assert_eq!(
            parse_api_url("http://127.0.0.1:8080/cloudapi/v6/")
                .expect("valid")
                .as_str(),
            "http://127.0.0.1:8080/cloudapi/v6/"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::Basic {
            username: "ops".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("ops"));
        assert!(!rendered.contains("hunter2"));

        let profile = ClientProfile {
            token: Some("secret-token".into()),
            ..ClientProfile::default()
        };
        assert!(!format!("{profile:?}").contains("secret-token"));
    }
}
