//! Client configuration shared by every endpoint.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Scope requested by password logins unless configured otherwise.
pub const DEFAULT_SCOPE: &str = "offline_access openid";

/// Value of the `Authorization` header attached to every endpoint request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientAuthorization(TokenSecret);
impl ClientAuthorization {
	/// HTTP Basic credentials derived from `client_id:client_secret`.
	pub fn basic(client_id: &str, client_secret: &TokenSecret) -> Self {
		let encoded = STANDARD.encode(format!("{client_id}:{}", client_secret.expose()));

		Self(TokenSecret::new(format!("Basic {encoded}")))
	}

	/// Uses `value` verbatim, for providers that expect a pre-shared header.
	pub fn custom(value: impl Into<String>) -> Self {
		Self(TokenSecret::new(value))
	}

	/// Header value. Callers must avoid logging it.
	pub fn value(&self) -> &TokenSecret {
		&self.0
	}

	fn validate(&self) -> Result<(), ConfigError> {
		self.0.to_header_value().map_err(|_| ConfigError::InvalidAuthorization)?;

		Ok(())
	}
}
impl Debug for ClientAuthorization {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ClientAuthorization").field(&"<redacted>").finish()
	}
}

/// Identity provider client configuration.
///
/// Values built through [`AuthConfig::new`] are validated. Deserialized values should be passed
/// through [`AuthConfig::validate`] before use.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
	/// Application identifier registered with the provider.
	pub client_id: String,
	/// Application secret; only used to derive the Basic authorization.
	pub client_secret: TokenSecret,
	/// Base URL that endpoint paths are resolved against.
	pub base_url: Url,
	/// Scope sent with password logins.
	#[serde(default = "default_scope")]
	pub default_scope: String,
	/// Explicit authorization header; HTTP Basic of the client credentials when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authorization: Option<ClientAuthorization>,
}
impl AuthConfig {
	/// Parses `base_url` and validates the result.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		base_url: &str,
	) -> Result<Self, ConfigError> {
		let base_url =
			Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let config = Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			base_url,
			default_scope: default_scope(),
			authorization: None,
		};

		config.validate()?;

		Ok(config)
	}

	/// Overrides the scope sent with password logins.
	pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
		self.default_scope = scope.into();

		self
	}

	/// Replaces the derived Basic authorization with an explicit value.
	pub fn with_authorization(
		mut self,
		authorization: ClientAuthorization,
	) -> Result<Self, ConfigError> {
		authorization.validate()?;

		self.authorization = Some(authorization);

		Ok(self)
	}

	/// Checks the invariants endpoints rely on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::EmptyClientId);
		}

		match self.base_url.scheme() {
			"http" | "https" => {},
			scheme => return Err(ConfigError::UnsupportedScheme { scheme: scheme.to_owned() }),
		}

		if self.base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeBase);
		}

		self.authorization_header().validate()
	}

	/// Authorization header value attached to endpoint requests.
	pub fn authorization_header(&self) -> ClientAuthorization {
		self.authorization
			.clone()
			.unwrap_or_else(|| ClientAuthorization::basic(&self.client_id, &self.client_secret))
	}
}

fn default_scope() -> String {
	DEFAULT_SCOPE.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn basic_authorization_encodes_client_credentials() {
		let config = AuthConfig::new("CID", "secret", "https://auth.example.com")
			.expect("Config fixture should validate.");

		// base64("CID:secret")
		assert_eq!(config.authorization_header().value().expose(), "Basic Q0lEOnNlY3JldA==");
		assert_eq!(config.default_scope, DEFAULT_SCOPE);
	}

	#[test]
	fn explicit_authorization_wins() {
		let config = AuthConfig::new("CID", "secret", "https://auth.example.com")
			.and_then(|config| {
				config.with_authorization(ClientAuthorization::custom("Basic Zml4ZWQ="))
			})
			.expect("Config fixture should validate.");

		assert_eq!(config.authorization_header().value().expose(), "Basic Zml4ZWQ=");
		assert!(matches!(
			AuthConfig::new("CID", "secret", "https://auth.example.com")
				.and_then(|config| config.with_authorization(ClientAuthorization::custom("a\nb"))),
			Err(ConfigError::InvalidAuthorization)
		));
	}

	#[test]
	fn invalid_configs_are_rejected() {
		assert!(matches!(
			AuthConfig::new(" ", "secret", "https://auth.example.com"),
			Err(ConfigError::EmptyClientId)
		));
		assert!(matches!(
			AuthConfig::new("CID", "secret", "ftp://auth.example.com"),
			Err(ConfigError::UnsupportedScheme { scheme }) if scheme == "ftp"
		));
		assert!(matches!(
			AuthConfig::new("CID", "secret", "not a url"),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}

	#[test]
	fn deserializes_with_defaults_and_redacts_secrets() {
		let config: AuthConfig = serde_json::from_value(serde_json::json!({
			"client_id": "CID",
			"client_secret": "super-secret",
			"base_url": "https://auth.example.com/",
		}))
		.expect("Config should deserialize.");

		config.validate().expect("Deserialized config should validate.");

		assert_eq!(config.default_scope, DEFAULT_SCOPE);
		assert!(config.authorization.is_none());
		assert!(!format!("{config:?}").contains("super-secret"));
	}
}
