//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
// self
use auth_gitlab::{
	api::{GitLabApi, RemoteUser},
	auth::{AuthProviderId, RemoteId, TokenPayload},
	pipeline::{PipelineState, StepContext},
	provider::{GitLabProvider, ProviderConfig, ProviderEndpoints},
	settings::Settings,
	store::MemoryIdentityStore,
	url::Url,
};

pub const CLIENT_ID: &str = "app-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const ACCESS_TOKEN: &str = "glpat-access";
pub const PROVIDER_MODEL: &str = "org-1-gitlab";
pub const REDIRECT_URI: &str = "https://sentry.example.com/auth/sso/";

pub fn settings(require_verified_email: bool) -> Arc<Settings> {
	Arc::new(
		Settings::builder(CLIENT_ID, CLIENT_SECRET, "gitlab.example.com")
			.require_verified_email(require_verified_email)
			.build()
			.expect("Settings fixture should build."),
	)
}

pub fn endpoints(server: &MockServer) -> ProviderEndpoints {
	let parse = |path: &str| Url::parse(&server.url(path)).expect("Mock URL should parse.");

	ProviderEndpoints::new(parse("/oauth/authorize"), parse("/oauth/token"), parse("/api/v4/"))
		.expect("Mock endpoints should validate.")
}

pub fn api(server: &MockServer) -> GitLabApi {
	GitLabApi::new(endpoints(server).api)
}

pub fn provider(
	server: &MockServer,
	config: ProviderConfig,
	require_verified_email: bool,
) -> GitLabProvider {
	GitLabProvider::with_endpoints(settings(require_verified_email), endpoints(server), config)
		.expect("Provider fixture should build.")
}

pub fn provider_model() -> AuthProviderId {
	AuthProviderId::new(PROVIDER_MODEL).expect("Provider model fixture should be valid.")
}

pub fn context(store: MemoryIdentityStore) -> StepContext {
	StepContext::new(
		provider_model(),
		Arc::new(store),
		Url::parse(REDIRECT_URI).expect("Redirect fixture should parse."),
	)
}

pub fn token_state() -> PipelineState {
	let mut state = PipelineState::default();

	state.bind_token(TokenPayload::new(ACCESS_TOKEN));

	state
}

pub fn remote_user(id: u64, email: Option<&str>) -> RemoteUser {
	RemoteUser {
		id: RemoteId::from(id),
		email: email.map(str::to_owned),
		name: "Ada Lovelace".into(),
		username: Some("ada".into()),
		confirmed_at: None,
	}
}

pub fn bearer() -> String {
	format!("Bearer {ACCESS_TOKEN}")
}
