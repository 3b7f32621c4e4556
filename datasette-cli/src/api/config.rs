//! Connection configuration for a Datasette instance

use serde::{Deserialize, Serialize};

/// Default Authorization header template. `{token}` is replaced with the
/// configured token value.
pub const DEFAULT_TOKEN_TEMPLATE: &str = "Bearer {token}";

/// Immutable connection settings shared by every API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    base_url: String,
    token: Option<String>,
    token_template: String,
}

impl ConnectionConfig {
    /// Create a config for the given base URL. Trailing slashes are stripped
    /// so request paths can be appended uniformly.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            token_template: DEFAULT_TOKEN_TEMPLATE.to_string(),
        }
    }

    /// Override the Authorization header template. Some deployments expect a
    /// fixed literal prefix on the token value, e.g. `"Bearer dstok_{token}"`.
    pub fn with_token_template(mut self, template: impl Into<String>) -> Self {
        self.token_template = template.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Render the Authorization header value, if a token is configured.
    pub fn authorization_header(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| self.token_template.replace("{token}", token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let config = ConnectionConfig::new("https://example.com/", None);
        assert_eq!(config.base_url(), "https://example.com");

        let config = ConnectionConfig::new("https://example.com//", None);
        assert_eq!(config.base_url(), "https://example.com");

        let config = ConnectionConfig::new("https://example.com", None);
        assert_eq!(config.base_url(), "https://example.com");
    }

    #[test]
    fn test_no_token_means_no_header() {
        let config = ConnectionConfig::new("https://example.com", None);
        assert_eq!(config.authorization_header(), None);
        assert!(!config.has_token());
    }

    #[test]
    fn test_default_bearer_header() {
        let config = ConnectionConfig::new("https://example.com", Some("abc123".to_string()));
        assert_eq!(
            config.authorization_header(),
            Some("Bearer abc123".to_string())
        );
    }

    #[test]
    fn test_prefixed_token_template() {
        let config = ConnectionConfig::new("https://example.com", Some("abc123".to_string()))
            .with_token_template("Bearer dstok_{token}");
        assert_eq!(
            config.authorization_header(),
            Some("Bearer dstok_abc123".to_string())
        );
    }
}
