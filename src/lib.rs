//! Typed request builder and response decoding pipeline for OAuth 2.0 identity providers.
//!
//! Endpoints hand out a [`request::Request`] per call. The request builds its wire form from typed
//! parameters, dispatches it exactly once through a [`http::Transport`], and decodes the
//! provider's answer with a pluggable [`decode::DecodeStrategy`] into a uniform
//! [`Result`](error::Result). Callers pick whichever completion style suits them: a callback,
//! a single-element stream, or a plain `.await`.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod obs;
pub mod request;
pub mod response;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		marker::PhantomData,
		pin::Pin,
		sync::Arc,
	};

	pub use oauth2::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::{
		error::{Error, ErrorCode, Result},
		response::JsonObject,
	};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
