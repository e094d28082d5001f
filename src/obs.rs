//! Optional observability helpers for pipeline requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_pipeline.request` with the `operation`
//!   (endpoint) and `style` ([`CompletionStyle`]) fields.
//! - Enable `metrics` to increment the `oauth2_pipeline_request_total` counter, labeled by
//!   `operation`, `style` and `outcome`. Per-request counts are always available through
//!   [`RequestStats`](crate::request::RequestStats).

mod tracing;

pub use tracing::*;

// self
use crate::_prelude::*;

/// Identity provider operations observed by the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Resource owner password login.
	PasswordLogin,
	/// One-time password login.
	OtpLogin,
	/// Forgot-password email trigger.
	ForgotPassword,
	/// Refresh token renewal.
	Renew,
	/// Refresh token revocation.
	Revoke,
	/// Request assembled directly by the caller.
	#[default]
	Custom,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::PasswordLogin => "password_login",
			Operation::OtpLogin => "otp_login",
			Operation::ForgotPassword => "forgot_password",
			Operation::Renew => "renew",
			Operation::Revoke => "revoke",
			Operation::Custom => "custom",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How the caller consumes a request result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionStyle {
	/// [`Request::start`](crate::request::Request::start) with a callback.
	Callback,
	/// A subscription to the request publisher.
	Stream,
	/// [`Request::send`](crate::request::Request::send) or `.await` on the request.
	Await,
}
impl CompletionStyle {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CompletionStyle::Callback => "callback",
			CompletionStyle::Stream => "stream",
			CompletionStyle::Await => "await",
		}
	}
}
impl Display for CompletionStyle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Request handed to the transport.
	Attempt,
	/// Decoded successfully.
	Success,
	/// Failure delivered to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
