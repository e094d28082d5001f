//! Transport primitives used by the request executor.
//!
//! The module exposes [`Transport`] alongside [`ResponseMetadata`] so downstream crates can
//! plug in custom HTTP stacks. A transport receives a fully built [`HttpRequest`] plus a
//! one-shot completion and must eventually hand that completion either the received
//! [`HttpResponse`] or a [`TransportError`]. Where the work runs is entirely up to the
//! transport; the pipeline owns no threads or event loops of its own.

pub use oauth2::{self, HttpRequest, HttpResponse};

// crates.io
use oauth2::http::header::RETRY_AFTER;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Raw outcome reported by a transport for one request.
pub type TransportOutcome = Result<HttpResponse, TransportError>;

/// One-shot completion handed to [`Transport::dispatch`].
pub type TransportCompletion = Box<dyn FnOnce(TransportOutcome) + Send>;

/// Abstraction over HTTP stacks capable of executing identity provider requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back every
/// request created by an endpoint factory. Each call to [`dispatch`](Transport::dispatch)
/// must issue exactly one network operation and invoke `completion` at most once, from
/// whatever thread the transport uses for its callbacks. A transport that drops the
/// completion without calling it surfaces as [`TransportError::Dropped`] to awaiting callers.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and reports the outcome through `completion`.
	fn dispatch(&self, request: HttpRequest, completion: TransportCompletion);
}

/// Captures metadata from an HTTP response for error classification.
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the provider, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl ResponseMetadata {
	/// Reads the status and Retry-After hint from a received response.
	pub fn from_response(response: &HttpResponse) -> Self {
		Self {
			status: Some(response.status().as_u16()),
			retry_after: parse_retry_after(response.headers()),
		}
	}
}

/// Default transport backed by [`ReqwestClient`].
///
/// Requests run on the tokio runtime supplied via [`ReqwestTransport::with_runtime`], or on the
/// runtime current at dispatch time. Identity provider endpoints return results directly, so
/// callers supplying their own client should disable redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	runtime: Option<tokio::runtime::Handle>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, runtime: None }
	}

	/// Pins dispatch to the provided runtime instead of the ambient one.
	pub fn with_runtime(mut self, runtime: tokio::runtime::Handle) -> Self {
		self.runtime = Some(runtime);

		self
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn dispatch(&self, request: HttpRequest, completion: TransportCompletion) {
		let runtime = match self.runtime.clone().map_or_else(tokio::runtime::Handle::try_current, Ok)
		{
			Ok(runtime) => runtime,
			Err(_) => {
				completion(Err(TransportError::NoRuntime));

				return;
			},
		};
		let client = self.client.clone();

		runtime.spawn(async move {
			completion(execute(&client, request).await);
		});
	}
}

#[cfg(feature = "reqwest")]
async fn execute(client: &ReqwestClient, request: HttpRequest) -> TransportOutcome {
	let response = client.execute(reqwest::Request::try_from(request)?).await?;
	let status = response.status();
	let headers = response.headers().to_owned();
	let mut converted = HttpResponse::new(response.bytes().await?.to_vec());

	*converted.status_mut() = status;
	*converted.headers_mut() = headers;

	Ok(converted)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
pub(crate) mod test_support {
	//! In-process transport that completes synchronously with canned outcomes.

	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;

	type OutcomeFactory = Box<dyn Fn() -> TransportOutcome + Send + Sync>;

	#[derive(Clone, Debug)]
	pub(crate) struct RecordedRequest {
		pub(crate) method: Method,
		pub(crate) uri: String,
		pub(crate) headers: HeaderMap,
		pub(crate) body: Vec<u8>,
	}

	pub(crate) struct StaticTransport {
		outcome: OutcomeFactory,
		requests: Mutex<Vec<RecordedRequest>>,
	}
	impl StaticTransport {
		pub(crate) fn new(outcome: impl 'static + Fn() -> TransportOutcome + Send + Sync) -> Self {
			Self { outcome: Box::new(outcome), requests: Mutex::default() }
		}

		pub(crate) fn json(status: u16, body: &'static str) -> Self {
			Self::new(move || {
				let mut response = HttpResponse::new(body.as_bytes().to_vec());

				*response.status_mut() =
					StatusCode::from_u16(status).expect("Status fixture should be valid.");

				Ok(response)
			})
		}

		pub(crate) fn dispatched(&self) -> usize {
			self.requests.lock().len()
		}

		pub(crate) fn last_request(&self) -> Option<RecordedRequest> {
			self.requests.lock().last().cloned()
		}
	}
	impl Transport for StaticTransport {
		fn dispatch(&self, request: HttpRequest, completion: TransportCompletion) {
			let (parts, body) = request.into_parts();

			self.requests.lock().push(RecordedRequest {
				method: parts.method,
				uri: parts.uri.to_string(),
				headers: parts.headers,
				body,
			});

			completion((self.outcome)());
		}
	}
}
