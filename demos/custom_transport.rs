//! Demonstrates plugging an in-process [`Transport`] into the pipeline and decoding responses
//! with a custom payload type and with a closure strategy.
//!
//! 1. Implement [`Transport`] and report every outcome through the provided completion.
//! 2. Implement [`FromJsonObject`] for payloads that do not map onto a serde type.
//! 3. Build requests directly with [`RequestBuilder`] and pick a strategy per request.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use oauth2_pipeline::{
	decode::{CustomPayload, FromJsonObject},
	error::{Error, TransportError},
	http::{
		HttpRequest, HttpResponse, Transport, TransportCompletion,
		oauth2::http::{Method, StatusCode},
	},
	request::{Request, RequestBuilder, Target},
	response::{Envelope, JsonObject},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base = Url::parse("https://provider.example.com")?;
	let transport = Arc::new(CannedTransport::default());
	let profile = Request::new(
		transport.clone(),
		RequestBuilder::new(Method::GET, Target::relative(base.clone(), "/api/user"))
			.with_parameters([("fields", "email")]),
		CustomPayload::<Profile>::new(),
	)
	.await?;

	println!("Profile email: {}.", profile.email);

	let status = Request::new(
		transport,
		RequestBuilder::new(Method::GET, Target::relative(base, "/api/status")),
		|envelope: Envelope| -> oauth2_pipeline::error::Result<u16> {
			envelope.status().ok_or_else(|| Error::invalid_response("Missing status."))
		},
	)
	.await?;

	println!("Status endpoint answered with HTTP {status}.");

	let failing = Request::new(
		Arc::new(CannedTransport { offline: true }),
		RequestBuilder::new(Method::GET, Url::parse("https://provider.example.com/api/user")?),
		CustomPayload::<Profile>::new(),
	);

	match failing.await {
		Ok(_) => println!("Offline transport unexpectedly succeeded."),
		Err(e) => {
			println!("Offline transport surfaced as {}: {}.", e.code(), e.debug_description())
		},
	}

	Ok(())
}

struct Profile {
	email: String,
}
impl FromJsonObject for Profile {
	fn from_json_object(object: &JsonObject) -> Option<Self> {
		Some(Self { email: object.get("email")?.as_str()?.to_owned() })
	}
}

#[derive(Default)]
struct CannedTransport {
	offline: bool,
}
impl Transport for CannedTransport {
	fn dispatch(&self, request: HttpRequest, completion: TransportCompletion) {
		if self.offline {
			completion(Err(TransportError::network(std::io::Error::other("airplane mode"))));

			return;
		}

		let mut response = HttpResponse::new(b"{\"email\":\"demo@example.com\"}".to_vec());

		*response.status_mut() =
			if request.uri().path() == "/api/status" { StatusCode::ACCEPTED } else { StatusCode::OK };

		completion(Ok(response));
	}
}
