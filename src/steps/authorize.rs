//! OAuth 2.0 authorization-code steps (with PKCE S256).
//!
//! [`OAuth2Login`] sends the user to GitLab's authorize page and [`OAuth2Callback`] redeems the
//! returned code for tokens, binding them as `data` in the pipeline state.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::CallbackError,
	oauth::OAuthClient,
	pipeline::{
		PendingAuthorization, PipelineState, PipelineStep, StepContext, StepFuture, StepOutcome,
		StepRequest,
	},
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const PKCE_METHOD: &str = "S256";

/// Redirects the user agent to the provider's authorize endpoint.
///
/// Requests that already carry the provider's answer (`code` or `error`) pass straight through
/// to the callback step.
#[derive(Clone, Debug)]
pub struct OAuth2Login {
	authorize_url: Url,
	client_id: String,
	scope: String,
}
impl OAuth2Login {
	/// Creates the login step.
	pub fn new(authorize_url: Url, client_id: impl Into<String>, scope: impl Into<String>) -> Self {
		Self { authorize_url, client_id: client_id.into(), scope: scope.into() }
	}

	fn build_authorize_url(&self, redirect_uri: &Url, state: &str, challenge: &str) -> Url {
		let mut url = self.authorize_url.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", redirect_uri.as_str());

		if !self.scope.is_empty() {
			pairs.append_pair("scope", &self.scope);
		}

		pairs.append_pair("state", state);
		pairs.append_pair("code_challenge", challenge);
		pairs.append_pair("code_challenge_method", PKCE_METHOD);

		drop(pairs);

		url
	}
}
impl PipelineStep for OAuth2Login {
	fn name(&self) -> &'static str {
		"oauth2_login"
	}

	fn handle<'a>(
		&'a self,
		ctx: &'a StepContext,
		request: &'a StepRequest,
		state: &'a mut PipelineState,
	) -> StepFuture<'a> {
		Box::pin(async move {
			if request.query("code").is_some() || request.query("error").is_some() {
				return Ok(StepOutcome::Next);
			}

			let nonce = random_string(STATE_LEN);
			let verifier = random_string(PKCE_VERIFIER_LEN);
			let url = self.build_authorize_url(
				&ctx.redirect_uri,
				&nonce,
				&compute_pkce_challenge(&verifier),
			);

			state.bind_authorization(PendingAuthorization {
				state: nonce,
				pkce_verifier: TokenSecret::new(verifier),
				redirect_uri: ctx.redirect_uri.clone(),
			});

			Ok(StepOutcome::Redirect(url))
		})
	}
}

/// Handles the provider redirect and exchanges the authorization code for tokens.
#[derive(Clone, Debug)]
pub struct OAuth2Callback {
	oauth: OAuthClient,
}
impl OAuth2Callback {
	/// Creates the callback step around a configured token client.
	pub fn new(oauth: OAuthClient) -> Self {
		Self { oauth }
	}
}
impl PipelineStep for OAuth2Callback {
	fn name(&self) -> &'static str {
		"oauth2_callback"
	}

	fn handle<'a>(
		&'a self,
		_ctx: &'a StepContext,
		request: &'a StepRequest,
		state: &'a mut PipelineState,
	) -> StepFuture<'a> {
		Box::pin(async move {
			if let Some(error) = request.query("error") {
				let reason = request.query("error_description").unwrap_or(error);

				return Ok(CallbackError::Denied { reason: reason.to_owned() }.into());
			}

			let Some(pending) = state.authorization() else {
				return Ok(CallbackError::InvalidState.into());
			};

			if request.query("state") != Some(pending.state.as_str()) {
				return Ok(CallbackError::InvalidState.into());
			}

			let Some(code) = request.query("code") else {
				return Ok(CallbackError::MissingCode.into());
			};
			let data =
				self.oauth.exchange_code(code, &pending.pkce_verifier, &pending.redirect_uri).await?;

			state.take_authorization();
			state.bind_token(data);

			Ok(StepOutcome::Next)
		})
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::AuthProviderId, error::HaltError, http::ReqwestHttpClient,
		provider::ProviderEndpoints, store::MemoryIdentityStore,
	};

	fn context() -> StepContext {
		StepContext::new(
			AuthProviderId::new("org-1-gitlab").expect("Provider fixture should be valid."),
			Arc::new(MemoryIdentityStore::default()),
			Url::parse("https://sentry.example.com/auth/sso/").expect("Redirect should parse."),
		)
	}

	fn login() -> OAuth2Login {
		OAuth2Login::new(
			Url::parse("https://gitlab.example.com/oauth/authorize")
				.expect("Authorize URL fixture should parse."),
			"app-id",
			"read_user read_api",
		)
	}

	fn callback() -> OAuth2Callback {
		let endpoints = ProviderEndpoints::new(
			Url::parse("https://gitlab.example.com/oauth/authorize")
				.expect("Authorize URL fixture should parse."),
			Url::parse("https://gitlab.example.com/oauth/token")
				.expect("Token URL fixture should parse."),
			Url::parse("https://gitlab.example.com/api/v4/").expect("API URL fixture should parse."),
		)
		.expect("Endpoints should validate.");
		let oauth = OAuthClient::new(
			&endpoints,
			"app-id",
			&TokenSecret::new("secret"),
			ReqwestHttpClient::new().expect("HTTP client should build."),
		)
		.expect("OAuth client should build.");

		OAuth2Callback::new(oauth)
	}

	#[test]
	fn pkce_challenge_matches_rfc_7636_vector() {
		assert_eq!(
			compute_pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[tokio::test]
	async fn login_redirects_with_pkce_and_state() {
		let mut state = PipelineState::default();
		let outcome = login()
			.handle(&context(), &StepRequest::get(), &mut state)
			.await
			.expect("Login should succeed.");
		let url = match outcome {
			StepOutcome::Redirect(url) => url,
			other => panic!("Login should redirect, got {other:?}."),
		};
		let pending = state.authorization().expect("Pending authorization should be bound.");
		let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();

		assert_eq!(pending.state.len(), STATE_LEN);
		assert_eq!(query["response_type"], "code");
		assert_eq!(query["client_id"], "app-id");
		assert_eq!(query["redirect_uri"], "https://sentry.example.com/auth/sso/");
		assert_eq!(query["scope"], "read_user read_api");
		assert_eq!(query["state"], pending.state);
		assert_eq!(query["code_challenge"], compute_pkce_challenge(pending.pkce_verifier.expose()));
		assert_eq!(query["code_challenge_method"], "S256");
	}

	#[tokio::test]
	async fn login_passes_provider_answers_through() {
		let mut state = PipelineState::default();
		let request = StepRequest::get().with_query("code", "abc").with_query("state", "xyz");
		let outcome =
			login().handle(&context(), &request, &mut state).await.expect("Login should succeed.");

		assert_eq!(outcome, StepOutcome::Next);
		assert!(state.authorization().is_none());
	}

	#[tokio::test]
	async fn callback_rejects_denials_and_state_mismatches() {
		let step = callback();
		let ctx = context();
		let mut state = PipelineState::default();
		let denied = StepRequest::get()
			.with_query("error", "access_denied")
			.with_query("error_description", "The resource owner denied the request");
		let outcome =
			step.handle(&ctx, &denied, &mut state).await.expect("Denial should not abort.");

		assert!(matches!(
			outcome,
			StepOutcome::Error(HaltError::Callback(CallbackError::Denied { ref reason }))
				if reason == "The resource owner denied the request"
		));

		let request = StepRequest::get().with_query("code", "abc").with_query("state", "forged");
		let outcome =
			step.handle(&ctx, &request, &mut state).await.expect("Missing state should not abort.");

		assert_eq!(outcome, StepOutcome::Error(CallbackError::InvalidState.into()));

		state.bind_authorization(PendingAuthorization {
			state: "expected".into(),
			pkce_verifier: TokenSecret::new("verifier"),
			redirect_uri: ctx.redirect_uri.clone(),
		});

		let outcome =
			step.handle(&ctx, &request, &mut state).await.expect("Mismatch should not abort.");

		assert_eq!(outcome, StepOutcome::Error(CallbackError::InvalidState.into()));

		let request = StepRequest::get().with_query("state", "expected");
		let outcome =
			step.handle(&ctx, &request, &mut state).await.expect("Missing code should not abort.");

		assert_eq!(outcome, StepOutcome::Error(CallbackError::MissingCode.into()));
		assert!(state.token().is_none());
	}
}
