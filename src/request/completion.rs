//! Completion styles offered by [`Request`].

// crates.io
use futures_util::stream::{self, Stream};
use tokio::sync::oneshot;
// self
use crate::{_prelude::*, obs::CompletionStyle, request::Request};

/// Boxed future returned by [`Request::send`].
pub type RequestFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Single-element stream returned by [`RequestPublisher::subscribe`].
pub type ResultStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Receiver of exactly one request result.
///
/// Closures taking a [`Result`] implement this trait, so callers usually pass one directly to
/// [`Request::start`].
pub trait Completable<T>
where
	Self: 'static + Send,
{
	/// Consumes the completion with the final result.
	fn resolve(self, result: Result<T>);
}
impl<T, F> Completable<T> for F
where
	F: 'static + Send + FnOnce(Result<T>),
{
	fn resolve(self, result: Result<T>) {
		self(result)
	}
}

/// Completion forwarding the result to an awaiting future.
pub(crate) struct Continuation<T>(pub(crate) oneshot::Sender<Result<T>>);
impl<T> Completable<T> for Continuation<T>
where
	T: 'static + Send,
{
	fn resolve(self, result: Result<T>) {
		// The receiver is gone when the caller stopped awaiting; nothing is left to notify.
		let _ = self.0.send(result);
	}
}

/// Cold publisher of a request's single result.
///
/// Each subscription performs its own network call, issued when the stream is first polled.
pub struct RequestPublisher<T> {
	request: Request<T>,
}
impl<T> RequestPublisher<T>
where
	T: 'static + Send,
{
	pub(crate) fn new(request: Request<T>) -> Self {
		Self { request }
	}

	/// Returns a stream that yields the request result once and then ends.
	pub fn subscribe(&self) -> ResultStream<T> {
		Box::pin(stream::once(self.request.send_as(CompletionStyle::Stream)))
	}
}
impl<T> Clone for RequestPublisher<T> {
	fn clone(&self) -> Self {
		Self { request: self.request.clone() }
	}
}
impl<T> Debug for RequestPublisher<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestPublisher").field("request", &self.request).finish()
	}
}
