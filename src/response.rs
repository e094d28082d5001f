//! Response envelope and error classification.
//!
//! Transports report a raw outcome (an [`HttpResponse`] or a [`TransportError`]). The executor
//! normalizes it into an [`Envelope`] so decode strategies see one shape regardless of what went
//! wrong, and [`classify`] turns any envelope that a strategy cannot accept into a structured
//! [`Error`].

// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{HttpResponse, ResponseMetadata, TransportOutcome},
};

/// JSON object as returned by the identity provider.
pub type JsonObject = serde_json::Map<String, JsonValue>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Decode-ready wrapper around a raw transport outcome.
///
/// The expected shapes are "transport error only" or "status plus body". Strategies must cope
/// with every partial combination; [`classify`] never panics on any of them.
#[derive(Debug, Default)]
pub struct Envelope {
	body: Option<Vec<u8>>,
	metadata: Option<ResponseMetadata>,
	error: Option<TransportError>,
}
impl Envelope {
	/// Assembles an envelope from its raw parts.
	pub fn new(
		body: Option<Vec<u8>>,
		metadata: Option<ResponseMetadata>,
		error: Option<TransportError>,
	) -> Self {
		Self { body, metadata, error }
	}

	/// Wraps a received HTTP response.
	pub fn from_response(response: HttpResponse) -> Self {
		let metadata = ResponseMetadata::from_response(&response);

		Self::new(Some(response.into_body()), Some(metadata), None)
	}

	/// Wraps a transport failure.
	pub fn from_transport_error(error: TransportError) -> Self {
		Self::new(None, None, Some(error))
	}

	/// Raw body bytes, if the transport produced any.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Status and retry metadata, when a response was received.
	pub fn metadata(&self) -> Option<&ResponseMetadata> {
		self.metadata.as_ref()
	}

	/// HTTP status code, when a response was received.
	pub fn status(&self) -> Option<u16> {
		self.metadata.as_ref().and_then(|meta| meta.status)
	}

	/// Transport failure, if any.
	pub fn transport_error(&self) -> Option<&TransportError> {
		self.error.as_ref()
	}

	/// Returns `true` for a transport-error-free envelope with a 2xx status.
	pub fn is_success(&self) -> bool {
		self.error.is_none() && self.status().is_some_and(is_success_status)
	}

	/// Returns the body as a JSON object, or the classified failure.
	///
	/// A successful response without content yields the [`ErrorCode::EmptyBody`] marker.
	pub fn into_object(self) -> Result<JsonObject> {
		if self.is_success() {
			let parsed = self
				.body
				.as_deref()
				.filter(|body| !body.is_empty())
				.and_then(|body| serde_json::from_slice::<JsonValue>(body).ok());

			if let Some(JsonValue::Object(object)) = parsed {
				return Ok(object);
			}
		}

		Err(classify(self))
	}

	/// Like [`Envelope::into_object`], but a successful response without content yields `None`.
	pub fn into_optional_object(self) -> Result<Option<JsonObject>> {
		match self.into_object() {
			Ok(object) => Ok(Some(object)),
			Err(e) if e.is(ErrorCode::EmptyBody) => Ok(None),
			Err(e) => Err(e),
		}
	}
}
impl From<TransportOutcome> for Envelope {
	fn from(outcome: TransportOutcome) -> Self {
		match outcome {
			Ok(response) => Self::from_response(response),
			Err(e) => Self::from_transport_error(e),
		}
	}
}

/// Produces the structured error describing `envelope`.
///
/// Classification order:
/// 1. transport error -> [`ErrorCode::Transport`] with the error as cause;
/// 2. missing status -> [`ErrorCode::InvalidResponse`];
/// 3. empty body -> [`ErrorCode::EmptyBody`] on 2xx, [`ErrorCode::RequestFailed`] otherwise;
/// 4. body that is not a JSON object -> [`ErrorCode::InvalidResponse`];
/// 5. JSON object on a failure status -> [`ErrorCode::RequestFailed`] with the provider's fields;
/// 6. JSON object on a 2xx status -> [`ErrorCode::InvalidResponse`] (the caller rejected it).
pub fn classify(envelope: Envelope) -> Error {
	let Envelope { body, metadata, error } = envelope;
	let status = metadata.and_then(|meta| meta.status);

	if let Some(e) = error {
		let err = Error::transport(e);

		return match status {
			Some(status) => err.with_status_code(status),
			None => err,
		};
	}

	let Some(status) = status else {
		return Error::invalid_response("Identity provider response is missing an HTTP status.");
	};
	let Some(body) = body.filter(|body| !body.is_empty()) else {
		return if is_success_status(status) {
			Error::empty_body(Some(status))
		} else {
			Error::new(ErrorCode::RequestFailed, format!("Request failed with HTTP status {status}."))
				.with_status_code(status)
		};
	};

	match serde_json::from_slice::<JsonValue>(&body) {
		Ok(JsonValue::Object(info)) if !is_success_status(status) => request_failed(status, info),
		Ok(JsonValue::Object(_)) => Error::invalid_response(
			"Identity provider response could not be decoded into the expected type.",
		)
		.with_status_code(status),
		Ok(_) => Error::invalid_response("Identity provider response is not a JSON object.")
			.with_status_code(status)
			.with_info(body_preview(&body)),
		Err(e) => Error::invalid_response("Identity provider returned a body that is not valid JSON.")
			.with_status_code(status)
			.with_info(body_preview(&body))
			.with_cause(e),
	}
}

fn request_failed(status: u16, info: JsonObject) -> Error {
	let summary = ["error_description", "message", "error"]
		.into_iter()
		.find_map(|key| info.get(key).and_then(JsonValue::as_str))
		.map(str::to_owned)
		.unwrap_or_else(|| format!("Request failed with HTTP status {status}."));

	Error::new(ErrorCode::RequestFailed, summary).with_status_code(status).with_info(info)
}

fn body_preview(body: &[u8]) -> JsonObject {
	let mut info = JsonObject::new();

	info.insert("body".into(), JsonValue::String(truncate_preview(String::from_utf8_lossy(body))));

	info
}

fn truncate_preview(body: impl AsRef<str>) -> String {
	let body = body.as_ref();

	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn is_success_status(status: u16) -> bool {
	(200..300).contains(&status)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn envelope(status: u16, body: &str) -> Envelope {
		Envelope::new(
			Some(body.as_bytes().to_vec()),
			Some(ResponseMetadata { status: Some(status), retry_after: None }),
			None,
		)
	}

	#[test]
	fn transport_error_keeps_cause() {
		let err = classify(Envelope::from_transport_error(TransportError::NoRuntime));

		assert!(err.is(ErrorCode::Transport));
		assert_eq!(err.status_code(), None);
		assert_eq!(
			err.cause().map(ToString::to_string).as_deref(),
			Some("No async runtime is available to dispatch the request.")
		);
	}

	#[test]
	fn missing_status_is_invalid_response() {
		let err = classify(Envelope::new(Some(b"{}".to_vec()), None, None));

		assert!(err.is(ErrorCode::InvalidResponse));
		assert!(classify(Envelope::default()).is(ErrorCode::InvalidResponse));
	}

	#[test]
	fn empty_success_body_is_marker() {
		let err = classify(envelope(204, ""));

		assert!(err.is(ErrorCode::EmptyBody));
		assert_eq!(err.status_code(), Some(204));

		let absent = classify(Envelope::new(
			None,
			Some(ResponseMetadata { status: Some(200), retry_after: None }),
			None,
		));

		assert!(absent.is(ErrorCode::EmptyBody));
	}

	#[test]
	fn empty_failure_body_is_request_failed() {
		let err = classify(envelope(503, ""));

		assert!(err.is(ErrorCode::RequestFailed));
		assert_eq!(err.status_code(), Some(503));
		assert_eq!(err.to_string(), "Request failed with HTTP status 503.");
	}

	#[test]
	fn failure_object_maps_provider_fields() {
		let err = classify(envelope(
			400,
			r#"{"error":"invalid_grant","error_description":"Refresh token expired."}"#,
		));

		assert!(err.is(ErrorCode::RequestFailed));
		assert_eq!(err.status_code(), Some(400));
		assert_eq!(err.oauth_error(), Some("invalid_grant"));
		assert_eq!(err.to_string(), "Refresh token expired.");

		let message_only = classify(envelope(500, r#"{"message":"Backend unavailable."}"#));

		assert_eq!(message_only.to_string(), "Backend unavailable.");

		let bare = classify(envelope(401, r#"{"error":"invalid_grant"}"#));

		assert_eq!(bare.to_string(), "invalid_grant");
		assert_eq!(bare.status_code(), Some(401));
	}

	#[test]
	fn non_json_and_non_object_bodies_are_invalid() {
		let html = classify(envelope(502, "<html>Bad Gateway</html>"));

		assert!(html.is(ErrorCode::InvalidResponse));
		assert_eq!(html.status_code(), Some(502));
		assert_eq!(html.info_str("body"), Some("<html>Bad Gateway</html>"));
		assert!(html.cause().is_some());

		let array = classify(envelope(200, "[1,2,3]"));

		assert!(array.is(ErrorCode::InvalidResponse));
		assert!(array.cause().is_none());
	}

	#[test]
	fn rejected_success_object_is_invalid_response() {
		let err = classify(envelope(200, r#"{"unexpected":true}"#));

		assert!(err.is(ErrorCode::InvalidResponse));
		assert!(err.info().is_empty());
	}

	#[test]
	fn into_object_and_optional_object() {
		let object = envelope(200, r#"{"ok":true}"#).into_object().expect("Object should decode.");

		assert_eq!(object.get("ok"), Some(&JsonValue::Bool(true)));
		assert!(
			envelope(200, "").into_optional_object().expect("Empty body should be allowed.").is_none()
		);
		assert!(envelope(200, "").into_object().expect_err("Empty body is a marker.").is(ErrorCode::EmptyBody));
		assert!(
			envelope(401, r#"{"error":"nope"}"#)
				.into_optional_object()
				.expect_err("Failure status should surface.")
				.is(ErrorCode::RequestFailed)
		);
	}

	#[test]
	fn previews_are_truncated() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = truncate_preview(&long);

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
