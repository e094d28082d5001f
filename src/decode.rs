//! Pluggable decode strategies turning an [`Envelope`] into a typed result.
//!
//! Each executor selects one strategy at construction time. Strategies are pure: they read
//! the envelope they are handed and nothing else, so concurrent invocations never interfere.
//! Every strategy except [`NoBody`] treats a successful response without content as an
//! [`ErrorCode::InvalidResponse`].

pub mod date;

pub use date::*;

// self
use crate::{_prelude::*, response::Envelope};

/// Maps an [`Envelope`] to a typed result.
///
/// Any `Fn(Envelope) -> Result<T> + Send + Sync` closure is a strategy as well, which is handy
/// for one-off endpoints.
pub trait DecodeStrategy<T>: Send + Sync {
	/// Decodes the envelope, classifying every failure into an [`Error`].
	fn decode(&self, envelope: Envelope) -> Result<T>;
}
impl<T, F> DecodeStrategy<T> for F
where
	F: Fn(Envelope) -> Result<T> + Send + Sync,
{
	fn decode(&self, envelope: Envelope) -> Result<T> {
		self(envelope)
	}
}

/// Capability for payload types that know how to build themselves from a JSON object.
pub trait FromJsonObject: Sized {
	/// Builds the payload, or returns `None` when the object does not describe one.
	fn from_json_object(object: &JsonObject) -> Option<Self>;
}

/// Returns the raw JSON object.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainObject;
impl DecodeStrategy<JsonObject> for PlainObject {
	fn decode(&self, envelope: Envelope) -> Result<JsonObject> {
		envelope.into_object().map_err(Error::require_content)
	}
}

/// Deserializes the JSON object into `T`, reading [`Timestamp`] fields with a [`DateDecoding`].
pub struct TypedObject<T> {
	date_decoding: DateDecoding,
	_target: PhantomData<fn() -> T>,
}
impl<T> TypedObject<T> {
	/// Creates a strategy using the provided date policy.
	pub fn new(date_decoding: DateDecoding) -> Self {
		Self { date_decoding, _target: PhantomData }
	}

	/// Dates are seconds relative to the decode instant.
	pub fn since_now() -> Self {
		Self::new(DateDecoding::SinceNow)
	}

	/// Dates are milliseconds since the Unix epoch.
	pub fn since_1970() -> Self {
		Self::new(DateDecoding::Since1970)
	}

	/// Active date policy.
	pub fn date_decoding(&self) -> DateDecoding {
		self.date_decoding
	}
}
impl<T> Clone for TypedObject<T> {
	fn clone(&self) -> Self {
		Self::new(self.date_decoding)
	}
}
impl<T> Default for TypedObject<T> {
	fn default() -> Self {
		Self::since_now()
	}
}
impl<T> Debug for TypedObject<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TypedObject")
			.field("target", &std::any::type_name::<T>())
			.field("date_decoding", &self.date_decoding)
			.finish()
	}
}
impl<T> DecodeStrategy<T> for TypedObject<T>
where
	T: DeserializeOwned,
{
	fn decode(&self, envelope: Envelope) -> Result<T> {
		let status = envelope.status();
		let object = envelope.into_object().map_err(Error::require_content)?;
		let now = OffsetDateTime::now_utc();

		with_date_decoding(self.date_decoding, now, || {
			serde_path_to_error::deserialize(JsonValue::Object(object))
		})
		.map_err(|e| {
			let err = Error::invalid_response(
				"Identity provider response does not match the expected schema.",
			)
			.with_cause(e);

			match status {
				Some(status) => err.with_status_code(status),
				None => err,
			}
		})
	}
}

/// Builds `T` through its [`FromJsonObject`] capability.
pub struct CustomPayload<T>(PhantomData<fn() -> T>);
impl<T> CustomPayload<T> {
	/// Creates the strategy.
	pub fn new() -> Self {
		Self(PhantomData)
	}
}
impl<T> Clone for CustomPayload<T> {
	fn clone(&self) -> Self {
		Self::new()
	}
}
impl<T> Default for CustomPayload<T> {
	fn default() -> Self {
		Self::new()
	}
}
impl<T> Debug for CustomPayload<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CustomPayload").field(&std::any::type_name::<T>()).finish()
	}
}
impl<T> DecodeStrategy<T> for CustomPayload<T>
where
	T: FromJsonObject,
{
	fn decode(&self, envelope: Envelope) -> Result<T> {
		let metadata = envelope.metadata().cloned();
		let object = envelope.into_object().map_err(Error::require_content)?;

		match T::from_json_object(&object) {
			Some(payload) => Ok(payload),
			None => {
				let body = serde_json::to_vec(&JsonValue::Object(object)).ok();

				Err(crate::response::classify(Envelope::new(body, metadata, None)))
			},
		}
	}
}

/// Succeeds with `()` for empty bodies and for any JSON object, which is discarded.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBody;
impl DecodeStrategy<()> for NoBody {
	fn decode(&self, envelope: Envelope) -> Result<()> {
		let object = envelope.into_optional_object()?;

		#[cfg(all(feature = "tracing", debug_assertions))]
		if let Some(object) = &object {
			tracing::debug!(?object, "Discarding unexpected payload on a no-body endpoint.");
		}
		#[cfg(not(all(feature = "tracing", debug_assertions)))]
		let _ = object;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::Credentials,
		error::TransportError,
		http::ResponseMetadata,
	};

	fn envelope(status: u16, body: &str) -> Envelope {
		Envelope::new(
			Some(body.as_bytes().to_vec()),
			Some(ResponseMetadata { status: Some(status), retry_after: None }),
			None,
		)
	}

	#[derive(Debug, PartialEq)]
	struct Profile {
		email: String,
	}
	impl FromJsonObject for Profile {
		fn from_json_object(object: &JsonObject) -> Option<Self> {
			let email = object.get("email")?.as_str()?.to_owned();

			Some(Self { email })
		}
	}

	#[test]
	fn plain_object_returns_the_object() {
		let object = PlainObject
			.decode(envelope(200, r#"{"sub":"42","roles":["admin"]}"#))
			.expect("Object should decode.");

		assert_eq!(object.get("sub").and_then(JsonValue::as_str), Some("42"));
		assert!(
			PlainObject
				.decode(envelope(200, ""))
				.expect_err("Empty body must fail.")
				.is(ErrorCode::InvalidResponse)
		);
		assert!(
			PlainObject
				.decode(envelope(404, r#"{"message":"Not found."}"#))
				.expect_err("Failure status must fail.")
				.is(ErrorCode::RequestFailed)
		);
	}

	#[test]
	fn typed_object_since_now_resolves_expiry() {
		let before = OffsetDateTime::now_utc();
		let credentials: Credentials = TypedObject::since_now()
			.decode(envelope(
				200,
				r#"{"access_token":"at","token_type":"Bearer","expires_in":3600,"refresh_token":"rt"}"#,
			))
			.expect("Credentials should decode.");
		let after = OffsetDateTime::now_utc();
		let expires_at = credentials.expires_at.instant();

		assert!(expires_at >= before + Duration::seconds(3600) - Duration::seconds(1));
		assert!(expires_at <= after + Duration::seconds(3600) + Duration::seconds(1));
		assert_eq!(credentials.access_token.expose(), "at");
		assert_eq!(
			credentials.refresh_token.as_ref().map(|token| token.expose()),
			Some("rt")
		);
	}

	#[test]
	fn typed_object_since_1970_reads_milliseconds() {
		let credentials: Credentials = TypedObject::since_1970()
			.decode(envelope(
				200,
				r#"{"access_token":"at","token_type":"Bearer","expires_in":1735689600001}"#,
			))
			.expect("Credentials should decode.");

		assert_eq!(credentials.expires_at.unix_millis(), 1_735_689_600_001);
	}

	#[test]
	fn typed_object_schema_mismatch_wraps_cause() {
		let err = TypedObject::<Credentials>::default()
			.decode(envelope(200, r#"{"access_token":42,"token_type":"Bearer","expires_in":1}"#))
			.expect_err("Schema mismatch must fail.");

		assert!(err.is(ErrorCode::InvalidResponse));
		assert_eq!(err.status_code(), Some(200));

		let cause = err.cause().expect("Parse failure should be kept as cause.");

		assert!(cause.to_string().starts_with("access_token"));
	}

	#[test]
	fn custom_payload_uses_capability() {
		let profile: Profile = CustomPayload::new()
			.decode(envelope(200, r#"{"email":"a@b.com"}"#))
			.expect("Profile should decode.");

		assert_eq!(profile, Profile { email: "a@b.com".into() });

		let err = CustomPayload::<Profile>::new()
			.decode(envelope(200, r#"{"name":"nobody"}"#))
			.expect_err("Missing email must fail.");

		assert!(err.is(ErrorCode::InvalidResponse));
		assert_eq!(err.status_code(), Some(200));
	}

	#[test]
	fn no_body_accepts_empty_and_objects() {
		assert!(NoBody.decode(envelope(200, "")).is_ok());
		assert!(NoBody.decode(envelope(204, "")).is_ok());
		assert!(NoBody.decode(envelope(200, r#"{"unexpected":"payload"}"#)).is_ok());

		let err = NoBody
			.decode(envelope(400, r#"{"error":"invalid_request"}"#))
			.expect_err("Failure status must surface.");

		assert!(err.is(ErrorCode::RequestFailed));
		assert_eq!(err.status_code(), Some(400));
		assert!(
			NoBody
				.decode(Envelope::from_transport_error(TransportError::NoRuntime))
				.expect_err("Transport errors must surface.")
				.is(ErrorCode::Transport)
		);
		assert!(
			NoBody
				.decode(envelope(200, "not json"))
				.expect_err("Unreadable bodies must surface.")
				.is(ErrorCode::InvalidResponse)
		);
	}

	#[test]
	fn closures_are_strategies() {
		let status_only = |envelope: Envelope| -> Result<u16> {
			envelope.status().ok_or_else(|| Error::invalid_response("No status."))
		};

		assert_eq!(status_only.decode(envelope(202, "")).expect("Status should be read."), 202);
	}
}
