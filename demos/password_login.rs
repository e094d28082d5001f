//! Demonstrates the password login, renewal, and revocation endpoints against a mock identity
//! provider, using each of the three completion styles once.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use futures_util::StreamExt;
use httpmock::prelude::*;
use tokio::sync::oneshot;
// self
use oauth2_pipeline::{
	config::AuthConfig,
	endpoints::Authentication,
	error::Result as PipelineResult,
	http::ReqwestTransport,
	reqwest::{Client, redirect::Policy},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900,\"refresh_token\":\"demo-refresh\"}",
			);
		})
		.await;
	let logout_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/logout");
			then.status(200);
		})
		.await;
	let config = AuthConfig::new("demo-client", "super-secret", &server.base_url())?;
	let transport = ReqwestTransport::with_client(
		Client::builder().redirect(Policy::none()).build()?,
	);
	let authentication = Authentication::with_transport(config, Arc::new(transport));
	let credentials = authentication.login("demo@example.com", "hunter2").await?;

	println!("Logged in; access token expires at {}.", credentials.expires_at.instant());

	let Some(refresh_token) = credentials.refresh_token else {
		return Err(color_eyre::eyre::eyre!("Provider did not issue a refresh token."));
	};
	let renewed = authentication
		.renew(&refresh_token)
		.stream()
		.next()
		.await
		.ok_or_else(|| color_eyre::eyre::eyre!("Renewal stream ended without a result."))??;

	println!("Renewed credentials: {renewed:?}.");

	let (sender, receiver) = oneshot::channel();

	authentication.revoke(&refresh_token).start(move |result: PipelineResult<()>| {
		let _ = sender.send(result);
	});
	receiver.await??;

	println!("Refresh token revoked.");

	token_mock.assert_hits_async(2).await;
	logout_mock.assert_async().await;

	Ok(())
}
