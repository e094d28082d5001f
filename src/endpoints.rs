//! Identity provider endpoints exposed as ready-to-run [`Request`]s.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	config::AuthConfig,
	decode::{DecodeStrategy, NoBody, TypedObject},
	http::Transport,
	obs::Operation,
	request::{ContentType, Request, RequestBuilder, Target},
};

const TOKEN_PATH: &str = "/oauth2/token";
const FORGOT_PASSWORD_PATH: &str = "/api/user/forgot-password";
const LOGOUT_PATH: &str = "/api/logout";

/// Factory for the authentication endpoints of one configured client.
///
/// Every method returns a fresh [`Request`]; nothing is sent until the request is started,
/// awaited, or subscribed to. All requests carry the configured authorization header.
#[derive(Clone)]
pub struct Authentication {
	config: AuthConfig,
	transport: Arc<dyn Transport>,
}
impl Authentication {
	/// Creates the factory on top of the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(config: AuthConfig) -> Self {
		Self::with_transport(config, Arc::new(crate::http::ReqwestTransport::default()))
	}

	/// Creates the factory on top of a caller-supplied transport.
	pub fn with_transport(config: AuthConfig, transport: Arc<dyn Transport>) -> Self {
		Self { config, transport }
	}

	/// Client configuration.
	pub fn config(&self) -> &AuthConfig {
		&self.config
	}

	/// Resource owner password login.
	pub fn login(&self, username: &str, password: &str) -> Request<Credentials> {
		let builder = self.builder(TOKEN_PATH, ContentType::FormEncoded).with_parameters([
			("username", username),
			("password", password),
			("client_id", self.config.client_id.as_str()),
			("grant_type", "password"),
			("scope", self.config.default_scope.as_str()),
		]);

		self.request(builder, TypedObject::since_now(), Operation::PasswordLogin)
	}

	/// Login with a one-time password delivered out of band.
	pub fn login_with_otp(&self, username: &str, otp: &str) -> Request<Credentials> {
		let builder = self.builder(TOKEN_PATH, ContentType::Json).with_parameters([
			("username", username),
			("otp", otp),
			("client_id", self.config.client_id.as_str()),
		]);

		self.request(builder, TypedObject::since_now(), Operation::OtpLogin)
	}

	/// Asks the provider to email a password reset link.
	pub fn forgot_password(&self, login_id: &str) -> Request<()> {
		let builder = self.builder(FORGOT_PASSWORD_PATH, ContentType::Json).with_parameters([
			("loginId", JsonValue::from(login_id)),
			("applicationId", self.config.client_id.as_str().into()),
			("sendForgotPasswordEmail", true.into()),
		]);

		self.request(builder, NoBody, Operation::ForgotPassword)
	}

	/// Exchanges a refresh token for new credentials.
	pub fn renew(&self, refresh_token: &TokenSecret) -> Request<Credentials> {
		let builder = self.builder(TOKEN_PATH, ContentType::FormEncoded).with_parameters([
			("client_id", self.config.client_id.as_str()),
			("refresh_token", refresh_token.expose()),
			("grant_type", "refresh_token"),
		]);

		self.request(builder, TypedObject::since_now(), Operation::Renew)
	}

	/// Revokes a refresh token on every device.
	pub fn revoke(&self, refresh_token: &TokenSecret) -> Request<()> {
		let builder = self.builder(LOGOUT_PATH, ContentType::Json).with_parameters([
			("refresh_token", JsonValue::from(refresh_token.expose())),
			("global", true.into()),
		]);

		self.request(builder, NoBody, Operation::Revoke)
	}

	fn builder(&self, path: &str, content_type: ContentType) -> RequestBuilder {
		RequestBuilder::new(Method::POST, Target::relative(self.config.base_url.clone(), path))
			.with_content_type(content_type)
			.with_authorization(self.config.authorization_header().value().clone())
	}

	fn request<T>(
		&self,
		builder: RequestBuilder,
		strategy: impl 'static + DecodeStrategy<T>,
		operation: Operation,
	) -> Request<T>
	where
		T: 'static + Send,
	{
		Request::new(Arc::clone(&self.transport), builder, strategy).with_operation(operation)
	}
}
impl Debug for Authentication {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authentication").field("config", &self.config).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::mpsc;
	// crates.io
	use oauth2::http::header::{AUTHORIZATION, CONTENT_TYPE};
	// self
	use super::*;
	use crate::http::test_support::{RecordedRequest, StaticTransport};

	fn authentication(transport: &Arc<StaticTransport>) -> Authentication {
		let config = AuthConfig::new("CID", "secret", "https://auth.example.com")
			.expect("Config fixture should validate.");

		Authentication::with_transport(config, transport.clone())
	}

	fn run<T>(request: Request<T>) -> Result<T>
	where
		T: 'static + Send,
	{
		let (sender, receiver) = mpsc::channel();

		request.start(move |result: Result<T>| {
			sender.send(result).expect("Receiver should be alive.");
		});

		receiver.recv().expect("Static transport completes synchronously.")
	}

	fn header<'a>(recorded: &'a RecordedRequest, name: &str) -> Option<&'a str> {
		recorded.headers.get(name).and_then(|value| value.to_str().ok())
	}

	fn query_items(recorded: &RecordedRequest) -> Vec<(String, String)> {
		Url::parse(&recorded.uri)
			.expect("Recorded URI should parse.")
			.query_pairs()
			.map(|(name, value)| (name.into_owned(), value.into_owned()))
			.collect()
	}

	fn json_body(recorded: &RecordedRequest) -> JsonValue {
		serde_json::from_slice(&recorded.body).expect("Body should be JSON.")
	}

	#[test]
	fn password_login_sends_form_query_items() {
		let transport = Arc::new(StaticTransport::json(
			200,
			r#"{"access_token":"at","token_type":"Bearer","expires_in":3600,"refresh_token":"rt","userId":"u-1"}"#,
		));
		let credentials =
			run(authentication(&transport).login("a@b.com", "p")).expect("Login should succeed.");
		let recorded = transport.last_request().expect("Request should be recorded.");

		assert_eq!(credentials.access_token.expose(), "at");
		assert_eq!(credentials.user_id.as_deref(), Some("u-1"));
		assert_eq!(recorded.method, Method::POST);
		assert!(recorded.uri.starts_with("https://auth.example.com/oauth2/token?"));
		assert!(recorded.body.is_empty());
		assert_eq!(
			query_items(&recorded),
			[
				("username".into(), "a@b.com".into()),
				("password".into(), "p".into()),
				("client_id".into(), "CID".into()),
				("grant_type".into(), "password".into()),
				("scope".into(), "offline_access openid".into()),
			]
		);
		assert_eq!(
			header(&recorded, CONTENT_TYPE.as_str()),
			Some("application/x-www-form-urlencoded")
		);
		assert_eq!(header(&recorded, AUTHORIZATION.as_str()), Some("Basic Q0lEOnNlY3JldA=="));
	}

	#[test]
	fn password_login_failure_is_request_failed() {
		let transport = Arc::new(StaticTransport::json(401, r#"{"error":"invalid_grant"}"#));
		let err = run(authentication(&transport).login("a@b.com", "wrong"))
			.expect_err("Rejected login must fail.");

		assert!(err.is(ErrorCode::RequestFailed));
		assert_eq!(err.status_code(), Some(401));
		assert_eq!(err.oauth_error(), Some("invalid_grant"));
	}

	#[test]
	fn otp_login_posts_json_to_token_endpoint() {
		let transport = Arc::new(StaticTransport::json(
			200,
			r#"{"access_token":"at","token_type":"Bearer","expires_in":60}"#,
		));

		run(authentication(&transport).login_with_otp("a@b.com", "123456"))
			.expect("OTP login should succeed.");

		let recorded = transport.last_request().expect("Request should be recorded.");

		assert_eq!(recorded.uri, "https://auth.example.com/oauth2/token");
		assert_eq!(header(&recorded, CONTENT_TYPE.as_str()), Some("application/json"));
		assert_eq!(
			json_body(&recorded),
			serde_json::json!({"username":"a@b.com","otp":"123456","client_id":"CID"})
		);
	}

	#[test]
	fn forgot_password_accepts_empty_success() {
		let transport = Arc::new(StaticTransport::json(200, ""));

		run(authentication(&transport).forgot_password("a@b.com"))
			.expect("Empty success body is accepted.");

		let recorded = transport.last_request().expect("Request should be recorded.");

		assert_eq!(recorded.uri, "https://auth.example.com/api/user/forgot-password");
		assert_eq!(
			json_body(&recorded),
			serde_json::json!({
				"loginId": "a@b.com",
				"applicationId": "CID",
				"sendForgotPasswordEmail": true,
			})
		);
	}

	#[test]
	fn renew_sends_refresh_grant() {
		let transport = Arc::new(StaticTransport::json(
			200,
			r#"{"access_token":"at2","token_type":"Bearer","expires_in":3600,"refresh_token":"rt2"}"#,
		));
		let credentials = run(authentication(&transport).renew(&TokenSecret::new("rt")))
			.expect("Renewal should succeed.");
		let recorded = transport.last_request().expect("Request should be recorded.");

		assert_eq!(credentials.refresh_token.as_ref().map(TokenSecret::expose), Some("rt2"));
		assert_eq!(
			query_items(&recorded),
			[
				("client_id".into(), "CID".into()),
				("refresh_token".into(), "rt".into()),
				("grant_type".into(), "refresh_token".into()),
			]
		);
	}

	#[test]
	fn revoke_is_global_and_ignores_payloads() {
		let transport = Arc::new(StaticTransport::json(200, r#"{"revoked":1}"#));

		run(authentication(&transport).revoke(&TokenSecret::new("rt")))
			.expect("Revocation should succeed.");

		let recorded = transport.last_request().expect("Request should be recorded.");

		assert_eq!(recorded.uri, "https://auth.example.com/api/logout");
		assert_eq!(json_body(&recorded), serde_json::json!({"refresh_token":"rt","global":true}));
	}

	#[test]
	fn base_path_is_replaced_by_endpoint_paths() {
		let transport = Arc::new(StaticTransport::json(200, ""));
		let config = AuthConfig::new("CID", "secret", "https://auth.example.com/tenant/")
			.expect("Config fixture should validate.");

		let authentication = Authentication::with_transport(config, transport.clone());

		run(authentication.revoke(&TokenSecret::new("rt"))).expect("Revocation should succeed.");

		assert_eq!(
			transport.last_request().map(|recorded| recorded.uri).as_deref(),
			Some("https://auth.example.com/api/logout")
		);
	}

	#[test]
	fn debug_output_hides_secrets() {
		let transport = Arc::new(StaticTransport::json(200, ""));
		let rendered = format!("{:?}", authentication(&transport));

		assert!(rendered.contains("CID"));
		assert!(!rendered.contains("\"secret\""));
	}
}
