//! Pipeline-level error types shared across the builder, classifier, strategies, and endpoints.

// self
use crate::_prelude::*;

/// Pipeline-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed, thread-safe error used as a diagnostic cause.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Classification attached to every [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	/// Network or connection failure reported by the transport.
	Transport,
	/// Body present but undecodable, not an object, or not matching the target schema.
	InvalidResponse,
	/// Provider answered with a failure status.
	RequestFailed,
	/// Successful status without a body; only the no-body strategy treats it as success.
	EmptyBody,
	/// The request could not be expressed on the wire (bad header, unresolvable URL).
	InvalidRequest,
}
impl ErrorCode {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::Transport => "transport",
			ErrorCode::InvalidResponse => "invalid_response",
			ErrorCode::RequestFailed => "request_failed",
			ErrorCode::EmptyBody => "empty_body",
			ErrorCode::InvalidRequest => "invalid_request",
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Structured error delivered on every failure path of the pipeline.
///
/// [`Display`] renders a short summary that is safe to log or show. The optional cause is
/// reserved for diagnostics; use [`Error::debug_description`] to render both.
///
/// Two errors compare equal when their codes and rendered descriptions match. Use
/// [`Error::is`] or [`Error::matches`] to branch on the code alone.
#[derive(Debug, ThisError)]
#[error("{description}")]
pub struct Error {
	code: ErrorCode,
	status_code: Option<u16>,
	description: String,
	info: JsonObject,
	#[source]
	cause: Option<BoxError>,
}
impl Error {
	/// Creates an error with the provided code and summary.
	pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
		Self {
			code,
			status_code: None,
			description: description.into(),
			info: JsonObject::new(),
			cause: None,
		}
	}

	/// Wraps a transport failure.
	pub fn transport(cause: impl 'static + Send + Sync + StdError) -> Self {
		Self::new(ErrorCode::Transport, "Network error occurred while calling the identity provider.")
			.with_cause(cause)
	}

	/// Builds the internal marker for a successful response without content.
	pub fn empty_body(status_code: Option<u16>) -> Self {
		let err = Self::new(ErrorCode::EmptyBody, "Identity provider returned an empty body.");

		match status_code {
			Some(status) => err.with_status_code(status),
			None => err,
		}
	}

	/// Builds an invalid-response error with the provided summary.
	pub fn invalid_response(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::InvalidResponse, description)
	}

	/// Builds a build-time failure.
	pub fn invalid_request(cause: impl 'static + Send + Sync + StdError) -> Self {
		Self::new(ErrorCode::InvalidRequest, "Request could not be built.").with_cause(cause)
	}

	/// Attaches an HTTP status code.
	pub fn with_status_code(mut self, status: u16) -> Self {
		self.status_code = Some(status);

		self
	}

	/// Attaches the underlying cause.
	pub fn with_cause(mut self, cause: impl 'static + Send + Sync + StdError) -> Self {
		self.cause = Some(Box::new(cause));

		self
	}

	/// Replaces the provider-supplied fields carried with the error.
	pub fn with_info(mut self, info: JsonObject) -> Self {
		self.info = info;

		self
	}

	/// Error classification.
	pub fn code(&self) -> ErrorCode {
		self.code
	}

	/// HTTP status code of the failing response, when one was received.
	pub fn status_code(&self) -> Option<u16> {
		self.status_code
	}

	/// Short summary, identical to the [`Display`] output.
	pub fn description(&self) -> &str {
		&self.description
	}

	/// Fields returned by the provider alongside the failure (`error`, `error_description`, ...).
	pub fn info(&self) -> &JsonObject {
		&self.info
	}

	/// Looks up a string field returned by the provider.
	pub fn info_str(&self, key: &str) -> Option<&str> {
		self.info.get(key).and_then(JsonValue::as_str)
	}

	/// OAuth `error` code returned by the provider, if any.
	pub fn oauth_error(&self) -> Option<&str> {
		self.info_str("error")
	}

	/// Underlying cause, for diagnostics only.
	pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
		self.cause.as_deref()
	}

	/// Returns `true` when the error carries the provided code.
	pub fn is(&self, code: ErrorCode) -> bool {
		self.code == code
	}

	/// Returns `true` when both errors carry the same code.
	pub fn matches(&self, other: &Self) -> bool {
		self.code == other.code
	}

	/// Summary followed by the cause, meant for debugging output only.
	pub fn debug_description(&self) -> String {
		append_cause(&self.description, self.cause.as_deref())
	}

	/// Converts the no-content marker into an invalid response; other errors pass through.
	pub(crate) fn require_content(self) -> Self {
		if self.is(ErrorCode::EmptyBody) {
			let mut err = Self::invalid_response("Identity provider returned an empty body.");

			err.status_code = self.status_code;

			err
		} else {
			self
		}
	}
}
impl PartialEq for Error {
	fn eq(&self, other: &Self) -> bool {
		self.code == other.code && self.to_string() == other.to_string()
	}
}

/// Configuration and validation failures raised while assembling endpoints.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client identifier is empty.
	#[error("Client identifier must not be empty.")]
	EmptyClientId,
	/// Base URL uses a scheme other than http or https.
	#[error("Base URL scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
	/// Base URL cannot serve as a base for endpoint paths.
	#[error("Base URL cannot be used as a base for endpoint paths.")]
	CannotBeBase,
	/// Base URL could not be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Authorization header value contains characters not allowed in HTTP headers.
	#[error("Authorization header value is invalid.")]
	InvalidAuthorization,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity provider.")]
	Io(#[from] std::io::Error),
	/// No async runtime was available to drive the request.
	#[error("No async runtime is available to dispatch the request.")]
	NoRuntime,
	/// The transport released the request without reporting an outcome.
	#[error("Request was dropped before completing.")]
	Dropped,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Error codes raised by a credentials manager built on top of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ManagerErrorCode {
	/// No credentials were found in the store.
	NoCredentials,
	/// The stored credentials do not contain a refresh token.
	NoRefreshToken,
	/// The credentials renewal failed.
	RenewFailed,
	/// Storing the renewed credentials failed.
	StoreFailed,
	/// The biometric authentication failed.
	BiometricsFailed,
	/// The revocation of the refresh token failed.
	RevokeFailed,
	/// The requested minimum TTL exceeds the lifetime of the renewed access token.
	LargeMinTtl {
		/// Requested minimum TTL in seconds.
		min_ttl: i64,
		/// Lifetime of the renewed access token in seconds.
		lifetime: i64,
	},
}
impl ManagerErrorCode {
	fn message(self) -> String {
		match self {
			Self::NoCredentials => "No credentials were found in the store.".into(),
			Self::NoRefreshToken =>
				"The stored credentials instance does not contain a refresh token.".into(),
			Self::RenewFailed => "The credentials renewal failed.".into(),
			Self::StoreFailed => "Storing the renewed credentials failed.".into(),
			Self::BiometricsFailed => "The biometric authentication failed.".into(),
			Self::RevokeFailed => "The revocation of the refresh token failed.".into(),
			Self::LargeMinTtl { min_ttl, lifetime } => format!(
				"The minTTL requested ({min_ttl}s) is greater than the lifetime of the renewed \
				 access token ({lifetime}s). Request a lower minTTL or increase the token \
				 expiration configured on the identity provider."
			),
		}
	}
}

/// Error raised by a credentials manager; renew and revoke failures wrap a pipeline [`Error`].
#[derive(Debug, ThisError)]
#[error("{}", .code.message())]
pub struct ManagerError {
	code: ManagerErrorCode,
	#[source]
	cause: Option<BoxError>,
}
impl ManagerError {
	/// Creates an error without a cause.
	pub fn new(code: ManagerErrorCode) -> Self {
		Self { code, cause: None }
	}

	/// Renewal failed because the pipeline reported `cause`.
	pub fn renew_failed(cause: Error) -> Self {
		Self::new(ManagerErrorCode::RenewFailed).with_cause(cause)
	}

	/// Revocation failed because the pipeline reported `cause`.
	pub fn revoke_failed(cause: Error) -> Self {
		Self::new(ManagerErrorCode::RevokeFailed).with_cause(cause)
	}

	/// Attaches the underlying cause.
	pub fn with_cause(mut self, cause: impl 'static + Send + Sync + StdError) -> Self {
		self.cause = Some(Box::new(cause));

		self
	}

	/// Error classification.
	pub fn code(&self) -> ManagerErrorCode {
		self.code
	}

	/// Underlying cause, for diagnostics only.
	pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
		self.cause.as_deref()
	}

	/// Pipeline error wrapped by renew/revoke failures.
	pub fn pipeline_cause(&self) -> Option<&Error> {
		self.cause.as_deref().and_then(|cause| cause.downcast_ref::<Error>())
	}

	/// Returns `true` when both errors carry the same code.
	pub fn matches(&self, other: &Self) -> bool {
		self.code == other.code
	}

	/// Summary followed by the cause, meant for debugging output only.
	pub fn debug_description(&self) -> String {
		append_cause(&self.code.message(), self.cause.as_deref())
	}
}
impl PartialEq for ManagerError {
	fn eq(&self, other: &Self) -> bool {
		self.code == other.code && self.to_string() == other.to_string()
	}
}

fn append_cause(message: &str, cause: Option<&(dyn StdError + Send + Sync)>) -> String {
	let Some(cause) = cause else {
		return message.to_owned();
	};
	let separator = if message.ends_with('.') { "" } else { "." };

	format!("{message}{separator} CAUSE: {cause}")
}
