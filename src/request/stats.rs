//! Per-request invocation counters.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	obs::{CompletionStyle, Operation, RequestOutcome},
};

/// Invocation counters shared by every clone of a [`Request`](crate::request::Request).
///
/// Each invocation counts one attempt under its [`CompletionStyle`] and exactly one success or
/// failure once the completion has been resolved.
#[derive(Debug, Default)]
pub struct RequestStats {
	callback: AtomicU64,
	stream: AtomicU64,
	r#await: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RequestStats {
	/// Returns the total number of invocations across all completion styles.
	pub fn attempts(&self) -> u64 {
		[CompletionStyle::Callback, CompletionStyle::Stream, CompletionStyle::Await]
			.into_iter()
			.map(|style| self.attempts_via(style))
			.sum()
	}

	/// Returns the number of invocations made through `style`.
	pub fn attempts_via(&self, style: CompletionStyle) -> u64 {
		self.attempt_counter(style).load(Ordering::Relaxed)
	}

	/// Returns the number of invocations that decoded successfully.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of invocations that delivered an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self, operation: Operation, style: CompletionStyle) {
		self.attempt_counter(style).fetch_add(1, Ordering::Relaxed);

		emit(operation, style, RequestOutcome::Attempt);
	}

	pub(crate) fn record_result<T>(
		&self,
		operation: Operation,
		style: CompletionStyle,
		result: &Result<T>,
	) {
		let outcome = match result {
			Ok(_) => {
				self.success.fetch_add(1, Ordering::Relaxed);

				RequestOutcome::Success
			},
			Err(e) => {
				self.failure.fetch_add(1, Ordering::Relaxed);

				#[cfg(feature = "tracing")]
				tracing::debug!(code = %e.code(), status = ?e.status_code(), "Request failed.");
				#[cfg(not(feature = "tracing"))]
				let _ = e;

				RequestOutcome::Failure
			},
		};

		emit(operation, style, outcome);
	}

	fn attempt_counter(&self, style: CompletionStyle) -> &AtomicU64 {
		match style {
			CompletionStyle::Callback => &self.callback,
			CompletionStyle::Stream => &self.stream,
			CompletionStyle::Await => &self.r#await,
		}
	}
}

fn emit(operation: Operation, style: CompletionStyle, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"oauth2_pipeline_request_total",
		"operation" => operation.as_str(),
		"style" => style.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (operation, style, outcome);
}
