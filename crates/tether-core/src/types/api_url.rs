//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL.
///
/// The base may carry a path prefix (for example `https://example.com/api`);
/// every endpoint path is appended to it.
///
/// # Example
///
/// ```
/// use tether_core::ApiUrl;
///
/// let api = ApiUrl::new("https://example.com/api/").unwrap();
/// assert_eq!(api.endpoint("/auth/refresh"), "https://example.com/api/auth/refresh");
/// assert_eq!(api.endpoint("boards"), "https://example.com/api/boards");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, is not absolute, or does
    /// not use `http`/`https`.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InvalidInputError::ApiUrl {
                    value: original.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                }
                .into());
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "missing host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must not contain a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_single_slash() {
        let api = ApiUrl::new("http://localhost:8080").unwrap();
        assert_eq!(api.endpoint("/boards"), "http://localhost:8080/boards");

        let api = ApiUrl::new("http://localhost:8080/api").unwrap();
        assert_eq!(api.endpoint("/boards/3"), "http://localhost:8080/api/boards/3");
        assert_eq!(api.endpoint("notices?page=2"), "http://localhost:8080/api/notices?page=2");
    }

    #[test]
    fn display_drops_trailing_slash() {
        let api = ApiUrl::new("https://example.com/").unwrap();
        assert_eq!(api.to_string(), "https://example.com");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(ApiUrl::new("ftp://example.com").is_err());
        assert!(ApiUrl::new("file:///tmp/api").is_err());
        assert!(ApiUrl::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn rejects_query_and_garbage() {
        assert!(ApiUrl::new("https://example.com/api?x=1").is_err());
        assert!(ApiUrl::new("not a url").is_err());
        assert!(ApiUrl::new("").is_err());
    }

    #[test]
    fn serde_roundtrip_validates() {
        let api: ApiUrl = serde_json::from_str("\"https://example.com/api\"").unwrap();
        assert_eq!(api.host(), Some("example.com"));
        assert!(serde_json::from_str::<ApiUrl>("\"ftp://example.com\"").is_err());
    }
}
