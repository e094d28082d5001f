//! Token and client-secret material that must stay out of logs.

// crates.io
use oauth2::http::header::InvalidHeaderValue;
// self
use crate::_prelude::*;

/// Refresh token, access token, client secret or ready-made authorization header.
///
/// Formatting never reveals the value. Clones share the same allocation, so a secret can be
/// handed to every request built from one configuration without copying it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(Arc<str>);
impl TokenSecret {
	/// Wraps a secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(Arc::from(value.into()))
	}

	/// Returns the raw value. Callers must avoid logging it.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the provider handed out an empty value.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Converts the secret into a header value flagged as sensitive.
	pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&self.0)?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self(Arc::from(value))
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
