//! Immutable description of one identity provider request.

// crates.io
use oauth2::http::header::{AUTHORIZATION, CONTENT_TYPE};
// self
use crate::{_prelude::*, auth::TokenSecret, http::HttpRequest};

/// Ordered request parameters.
pub type Parameters = JsonObject;

/// How parameters travel when they do not go into the query string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentType {
	/// `application/json`; parameters become a JSON object body.
	#[default]
	Json,
	/// `application/x-www-form-urlencoded`; parameters become query items.
	FormEncoded,
}
impl ContentType {
	/// MIME type sent in the `Content-Type` header.
	pub const fn as_str(self) -> &'static str {
		match self {
			ContentType::Json => "application/json",
			ContentType::FormEncoded => "application/x-www-form-urlencoded",
		}
	}
}
impl Display for ContentType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where a request goes: an absolute URL or a path resolved against a base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
	/// Fully qualified URL.
	Absolute(Url),
	/// Path joined onto `base` at build time.
	Relative {
		/// Base URL of the identity provider.
		base: Url,
		/// Endpoint path; a leading `/` replaces the base path.
		path: String,
	},
}
impl Target {
	/// Creates a relative target.
	pub fn relative(base: Url, path: impl Into<String>) -> Self {
		Self::Relative { base, path: path.into() }
	}

	/// Resolves the final URL.
	pub fn resolve(&self) -> Result<Url, url::ParseError> {
		match self {
			Self::Absolute(url) => Ok(url.clone()),
			Self::Relative { base, path } => base.join(path),
		}
	}
}
impl From<Url> for Target {
	fn from(url: Url) -> Self {
		Self::Absolute(url)
	}
}

/// Immutable request description consumed by a [`Request`](crate::request::Request).
///
/// Every combinator returns an updated copy. Parameters go into the query string for `GET`
/// requests and for form-encoded requests, and into a JSON body otherwise. Headers are applied
/// in three layers: `Content-Type`, then the fixed `Authorization` value, then caller headers,
/// so a caller header overrides either fixed header with the same (case-insensitive) name.
#[derive(Clone)]
pub struct RequestBuilder {
	method: Method,
	target: Target,
	parameters: Parameters,
	headers: BTreeMap<String, String>,
	content_type: ContentType,
	authorization: Option<TokenSecret>,
}
impl RequestBuilder {
	/// Creates a JSON request without parameters or headers.
	pub fn new(method: Method, target: impl Into<Target>) -> Self {
		Self {
			method,
			target: target.into(),
			parameters: Parameters::new(),
			headers: BTreeMap::new(),
			content_type: ContentType::default(),
			authorization: None,
		}
	}

	/// Merges `extra` into the parameters; supplied values win on key collision.
	///
	/// Existing keys keep their position, new keys are appended in iteration order.
	pub fn with_parameters<I, K, V>(mut self, extra: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		for (name, value) in extra {
			self.parameters.insert(name.into(), value.into());
		}

		self
	}

	/// Merges `extra` into the caller headers; supplied values win on key collision.
	pub fn with_headers<I, K, V>(mut self, extra: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (name, value) in extra {
			self.headers.insert(name.into().to_ascii_lowercase(), value.into());
		}

		self
	}

	/// Sets the content type.
	pub fn with_content_type(mut self, content_type: ContentType) -> Self {
		self.content_type = content_type;

		self
	}

	/// Sets the fixed `Authorization` header value.
	pub fn with_authorization(mut self, value: TokenSecret) -> Self {
		self.authorization = Some(value);

		self
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Request target.
	pub fn target(&self) -> &Target {
		&self.target
	}

	/// Ordered parameters.
	pub fn parameters(&self) -> &Parameters {
		&self.parameters
	}

	/// Caller headers, keyed by lowercase name.
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Caller header value by (case-insensitive) name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Content type.
	pub fn content_type(&self) -> ContentType {
		self.content_type
	}

	/// Returns `true` when parameters are placed in the query string.
	pub fn parameters_in_query(&self) -> bool {
		self.method.as_str().eq_ignore_ascii_case("GET")
			|| self.content_type == ContentType::FormEncoded
	}

	/// Produces the wire request.
	///
	/// A JSON body that fails to serialize is left out without raising an error. Targets that
	/// do not resolve and headers that are not valid HTTP fail with
	/// [`ErrorCode::InvalidRequest`].
	pub fn build(&self) -> Result<HttpRequest> {
		let mut url = self.target.resolve().map_err(Error::invalid_request)?;
		let mut body = Vec::new();

		if !self.parameters.is_empty() {
			if self.parameters_in_query() {
				let mut query = url.query_pairs_mut();

				for (name, value) in &self.parameters {
					query.append_pair(name, &query_value(value));
				}
			} else if let Ok(json) = serde_json::to_vec(&self.parameters) {
				body = json;
			}
		}

		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type.as_str()));

		if let Some(authorization) = &self.authorization {
			headers.insert(
				AUTHORIZATION,
				authorization.to_header_value().map_err(Error::invalid_request)?,
			);
		}
		for (name, value) in &self.headers {
			let name = HeaderName::from_bytes(name.as_bytes()).map_err(Error::invalid_request)?;
			let value = HeaderValue::from_str(value).map_err(Error::invalid_request)?;

			headers.insert(name, value);
		}

		let mut request = HttpRequest::new(body);

		*request.method_mut() = self.method.clone();
		*request.uri_mut() = url.as_str().parse().map_err(Error::invalid_request)?;
		*request.headers_mut() = headers;

		Ok(request)
	}
}
impl Debug for RequestBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestBuilder")
			.field("method", &self.method)
			.field("target", &self.target)
			.field("parameters", &self.parameters.keys().collect::<Vec<_>>())
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.field("content_type", &self.content_type)
			.field("authorization_set", &self.authorization.is_some())
			.finish()
	}
}

fn query_value(value: &JsonValue) -> String {
	match value {
		JsonValue::String(text) => text.clone(),
		JsonValue::Null => String::new(),
		other => other.to_string(),
	}
}
