//! Credentials issued by the identity provider's token endpoint.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	decode::Timestamp,
	error::{ManagerError, ManagerErrorCode},
};

/// Tokens returned by a successful login or renewal.
///
/// `expires_at` is read from the provider's `expires_in` field; how the number is interpreted
/// depends on the [`DateDecoding`](crate::decode::DateDecoding) of the strategy that decoded it.
/// Serializing a value writes the absolute expiry in milliseconds, so persisted credentials are
/// read back with [`TypedObject::since_1970`](crate::decode::TypedObject::since_1970).
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
	/// Access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type, usually `Bearer`.
	pub token_type: String,
	/// Refresh token, issued when `offline_access` was granted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// OpenID Connect ID token, issued when `openid` was granted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<TokenSecret>,
	/// Absolute expiry of the access token.
	#[serde(rename = "expires_in")]
	pub expires_at: Timestamp,
	/// Granted scopes, space-delimited.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Identifier of the authenticated user.
	#[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
}
impl Credentials {
	/// Returns `true` if the access token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at.instant()
	}

	/// Returns `true` if the access token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at the provided instant, clamped at zero.
	pub fn lifetime_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at.instant() - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}

	/// Returns `true` if the token expires within `ttl` of the provided instant.
	pub fn expires_within(&self, ttl: Duration, instant: OffsetDateTime) -> bool {
		self.lifetime_at(instant) <= ttl
	}

	/// Rejects freshly renewed credentials whose lifetime cannot satisfy `min_ttl`.
	pub fn ensure_min_ttl(
		&self,
		min_ttl: Duration,
		instant: OffsetDateTime,
	) -> Result<(), ManagerError> {
		let lifetime = self.lifetime_at(instant);

		if min_ttl > lifetime {
			return Err(ManagerError::new(ManagerErrorCode::LargeMinTtl {
				min_ttl: min_ttl.whole_seconds(),
				lifetime: lifetime.whole_seconds(),
			}));
		}

		Ok(())
	}

	/// Scopes granted to these credentials.
	pub fn scopes(&self) -> impl Iterator<Item = &str> {
		self.scope.as_deref().unwrap_or_default().split_whitespace()
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("scope", &self.scope)
			.field("user_id", &self.user_id)
			.finish()
	}
}
