//! Date policies applied while decoding typed objects.
//!
//! [`Timestamp`] fields have no fixed wire format: the strategy that decodes an object picks
//! the policy, and the policy is visible to [`Timestamp`]'s deserializer only for the duration
//! of that single synchronous decode on the current thread. Outside any decode scope the
//! persisted form (milliseconds since the epoch) applies, which is also what [`Timestamp`]
//! serializes to.

// std
use std::cell::Cell;
// crates.io
use serde::{Deserializer, Serializer, de::Error as _, ser::Error as _};
use serde_json::Number;
// self
use crate::_prelude::*;

const MAX_OFFSET_SECS: i64 = 1_000_000_000_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// How numeric date fields are read by [`TypedObject`](crate::decode::TypedObject).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DateDecoding {
	/// Seconds relative to the decode instant (`expires_in` style fields).
	#[default]
	SinceNow,
	/// Milliseconds since the Unix epoch.
	Since1970,
}

#[derive(Clone, Copy)]
struct DateContext {
	decoding: DateDecoding,
	now: OffsetDateTime,
}

thread_local! {
	static CONTEXT: Cell<Option<DateContext>> = const { Cell::new(None) };
}

/// Runs `f` with `decoding` in effect for every [`Timestamp`] decoded on this thread.
pub(crate) fn with_date_decoding<R>(
	decoding: DateDecoding,
	now: OffsetDateTime,
	f: impl FnOnce() -> R,
) -> R {
	struct Restore(Option<DateContext>);
	impl Drop for Restore {
		fn drop(&mut self) {
			CONTEXT.with(|cell| cell.set(self.0));
		}
	}

	let _restore =
		Restore(CONTEXT.with(|cell| cell.replace(Some(DateContext { decoding, now }))));

	f()
}

/// Absolute instant decoded from a numeric field according to the active [`DateDecoding`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);
impl Timestamp {
	/// Wraps an absolute instant.
	pub fn new(instant: OffsetDateTime) -> Self {
		Self(instant)
	}

	/// Resolves a whole number of seconds against `now`.
	pub fn from_offset(now: OffsetDateTime, seconds: i64) -> Option<Self> {
		if seconds.unsigned_abs() > MAX_OFFSET_SECS.unsigned_abs() {
			return None;
		}

		now.checked_add(Duration::seconds(seconds)).map(Self)
	}

	/// Resolves a fractional offset in seconds against `now`.
	pub fn from_offset_f64(now: OffsetDateTime, seconds: f64) -> Option<Self> {
		if !seconds.is_finite() || seconds.abs() > MAX_OFFSET_SECS as f64 {
			return None;
		}

		now.checked_add(Duration::seconds_f64(seconds)).map(Self)
	}

	/// Reads whole milliseconds since the Unix epoch without loss.
	pub fn from_unix_millis(millis: i64) -> Option<Self> {
		OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI).ok().map(Self)
	}

	/// Reads fractional milliseconds since the Unix epoch.
	///
	/// Precision is bounded by `f64`; integral values should go through
	/// [`Timestamp::from_unix_millis`].
	pub fn from_unix_millis_f64(millis: f64) -> Option<Self> {
		if !millis.is_finite() {
			return None;
		}

		let nanos = (millis * NANOS_PER_MILLI as f64).round() as i128;

		OffsetDateTime::from_unix_timestamp_nanos(nanos).ok().map(Self)
	}

	/// Absolute instant.
	pub fn instant(self) -> OffsetDateTime {
		self.0
	}

	/// Milliseconds since the Unix epoch.
	pub fn unix_millis(self) -> i128 {
		self.0.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI)
	}
}
impl From<OffsetDateTime> for Timestamp {
	fn from(instant: OffsetDateTime) -> Self {
		Self(instant)
	}
}
impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let millis = i64::try_from(self.unix_millis())
			.map_err(|_| S::Error::custom("timestamp exceeds the millisecond range"))?;

		serializer.serialize_i64(millis)
	}
}
impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		// Integral values stay integral; only fractional input goes through `f64`.
		let value = Number::deserialize(deserializer)?;
		let decoded = match (CONTEXT.with(Cell::get), value.as_i64()) {
			(Some(DateContext { decoding: DateDecoding::SinceNow, now }), Some(seconds)) =>
				Self::from_offset(now, seconds),
			(Some(DateContext { decoding: DateDecoding::SinceNow, now }), None) =>
				value.as_f64().and_then(|seconds| Self::from_offset_f64(now, seconds)),
			(_, Some(millis)) => Self::from_unix_millis(millis),
			(_, None) => value.as_f64().and_then(Self::from_unix_millis_f64),
		};

		decoded.ok_or_else(|| D::Error::custom(format!("date value {value} is out of range")))
	}
}
