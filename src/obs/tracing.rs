// self
use crate::{
	_prelude::*,
	obs::{CompletionStyle, Operation},
};

/// Span wrapped around one request invocation, from build to completion.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
	style: CompletionStyle,
}
impl RequestSpan {
	/// Creates a span tagged with the endpoint and the completion style in use.
	pub fn new(operation: Operation, style: CompletionStyle) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_pipeline.request",
				operation = operation.as_str(),
				style = style.as_str()
			);

			Self { span, style }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = operation;

			Self { style }
		}
	}

	/// Completion style carried by the span.
	pub fn style(&self) -> CompletionStyle {
		self.style
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> RequestSpanGuard {
		#[cfg(feature = "tracing")]
		{
			RequestSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			RequestSpanGuard {}
		}
	}
}

/// RAII guard returned by [`RequestSpan::entered`].
pub struct RequestSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for RequestSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RequestSpanGuard(..)")
	}
}
