//! Single-use request executor and its completion styles.
//!
//! A [`Request`] pairs a [`RequestBuilder`] with a [`Transport`] and a [`DecodeStrategy`].
//! Each invocation builds the wire request, dispatches it exactly once, and hands the decoded
//! result to the caller through one of three equivalent forms:
//!
//! - [`Request::start`] with a callback (any [`Completable`]);
//! - [`Request::publisher`] / [`Request::stream`] for a cold single-element stream;
//! - [`Request::send`] or `.await` on the request itself.
//!
//! All forms run the same pipeline, so they deliver identical results for identical transport
//! outcomes. Callbacks run on whatever thread the transport completes on.

pub mod builder;
pub mod completion;
pub mod stats;

pub use builder::*;
pub use completion::*;
pub use stats::*;

// std
use std::future::IntoFuture;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	decode::DecodeStrategy,
	error::TransportError,
	http::Transport,
	obs::{self, CompletionStyle, Operation, RequestOutcome, RequestSpan},
	request::completion::Continuation,
	response::Envelope,
};

/// Executable request producing a `T` on success.
///
/// Cloning is cheap; the transport, strategy and [`RequestStats`] are shared.
pub struct Request<T> {
	builder: RequestBuilder,
	transport: Arc<dyn Transport>,
	strategy: Arc<dyn DecodeStrategy<T>>,
	operation: Operation,
	stats: Arc<RequestStats>,
}
impl<T> Request<T>
where
	T: 'static + Send,
{
	/// Creates a request executed through `transport` and decoded with `strategy`.
	pub fn new(
		transport: Arc<dyn Transport>,
		builder: RequestBuilder,
		strategy: impl 'static + DecodeStrategy<T>,
	) -> Self {
		Self {
			builder,
			transport,
			strategy: Arc::new(strategy),
			operation: Operation::default(),
			stats: Arc::default(),
		}
	}

	/// Labels the request for spans and metrics.
	pub fn with_operation(mut self, operation: Operation) -> Self {
		self.operation = operation;

		self
	}

	/// Merges extra parameters; see [`RequestBuilder::with_parameters`].
	pub fn with_parameters<I, K, V>(mut self, extra: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		self.builder = self.builder.with_parameters(extra);

		self
	}

	/// Merges extra headers; see [`RequestBuilder::with_headers`].
	pub fn with_headers<I, K, V>(mut self, extra: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.builder = self.builder.with_headers(extra);

		self
	}

	/// Request description.
	pub fn builder(&self) -> &RequestBuilder {
		&self.builder
	}

	/// Operation label.
	pub fn operation(&self) -> Operation {
		self.operation
	}

	/// Invocation counters shared with every clone of this request.
	pub fn stats(&self) -> &RequestStats {
		&self.stats
	}

	/// Dispatches the request and delivers the result to `completion` exactly once.
	///
	/// Build failures are delivered without touching the transport.
	pub fn start<C>(&self, completion: C)
	where
		C: Completable<T>,
	{
		self.run(CompletionStyle::Callback, completion);
	}

	/// Returns a future resolving to the request result.
	///
	/// The network call is issued on first poll. A transport that drops its completion resolves
	/// the future with an [`ErrorCode::Transport`] error.
	pub fn send(&self) -> RequestFuture<T> {
		self.send_as(CompletionStyle::Await)
	}

	pub(crate) fn send_as(&self, style: CompletionStyle) -> RequestFuture<T> {
		let request = self.clone();

		Box::pin(async move {
			let (sender, receiver) = oneshot::channel();

			request.run(style, Continuation(sender));

			receiver.await.unwrap_or_else(|_| Err(Error::transport(TransportError::Dropped)))
		})
	}

	/// Returns a cold publisher; every subscription performs one network call.
	pub fn publisher(&self) -> RequestPublisher<T> {
		RequestPublisher::new(self.clone())
	}

	/// Shorthand for `self.publisher().subscribe()`.
	pub fn stream(&self) -> ResultStream<T> {
		self.publisher().subscribe()
	}

	fn run<C>(&self, style: CompletionStyle, completion: C)
	where
		C: Completable<T>,
	{
		let operation = self.operation;
		let span = RequestSpan::new(operation, style);
		let _guard = span.clone().entered();

		self.stats.record_attempt(operation, style);

		let wire = match self.builder.build() {
			Ok(wire) => wire,
			Err(e) => {
				finish(&self.stats, operation, style, Err(e), completion);

				return;
			},
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(method = %wire.method(), path = wire.uri().path(), "Dispatching request.");

		let strategy = Arc::clone(&self.strategy);
		let stats = Arc::clone(&self.stats);

		self.transport.dispatch(
			wire,
			Box::new(move |outcome| {
				let _guard = span.entered();
				let envelope = Envelope::from(outcome);

				log_response_body(&envelope);
				finish(&stats, operation, style, strategy.decode(envelope), completion);
			}),
		);
	}
}
impl<T> Clone for Request<T> {
	fn clone(&self) -> Self {
		Self {
			builder: self.builder.clone(),
			transport: Arc::clone(&self.transport),
			strategy: Arc::clone(&self.strategy),
			operation: self.operation,
			stats: Arc::clone(&self.stats),
		}
	}
}
impl<T> Debug for Request<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Request")
			.field("operation", &self.operation)
			.field("builder", &self.builder)
			.finish_non_exhaustive()
	}
}
impl<T> IntoFuture for Request<T>
where
	T: 'static + Send,
{
	type IntoFuture = RequestFuture<T>;
	type Output = Result<T>;

	fn into_future(self) -> Self::IntoFuture {
		self.send()
	}
}

fn finish<T, C>(
	stats: &RequestStats,
	operation: Operation,
	style: CompletionStyle,
	result: Result<T>,
	completion: C,
) where
	C: Completable<T>,
{
	stats.record_result(operation, style, &result);
	completion.resolve(result);
}

fn log_response_body(envelope: &Envelope) {
	#[cfg(all(feature = "tracing", debug_assertions))]
	if let Some(body) = envelope.body() {
		tracing::debug!(
			status = ?envelope.status(),
			body = %String::from_utf8_lossy(body),
			"Received response body."
		);
	}
	#[cfg(not(all(feature = "tracing", debug_assertions)))]
	let _ = envelope;
}
