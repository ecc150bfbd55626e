//! GitLab identity provider.

// self
use crate::{
	_prelude::*,
	api::GitLabApi,
	auth::{LocalIdentity, RemoteId},
	error::{IdentityInvalid, PipelineError},
	http::ReqwestHttpClient,
	oauth::OAuthClient,
	obs::{self, ObsSpan, RefreshOutcome},
	pipeline::{Pipeline, PipelineKind, PipelineState},
	provider::{AuthProvider, ProviderEndpoints, RefreshFuture},
	settings::{SCOPE, Settings},
	steps::{ConfirmEmail, FetchUser, OAuth2Callback, OAuth2Login, SelectGroup},
	view::View,
};

/// Group that gates logins, as persisted in [`ProviderConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundGroup {
	/// Group id.
	pub id: RemoteId,
	/// Group name at selection time.
	pub name: String,
}

/// Per-organization provider configuration produced by the setup pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Bound group; `None` disables group gating.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<BoundGroup>,
}
impl ProviderConfig {
	/// Configuration gated on `group`.
	pub fn gated(id: RemoteId, name: impl Into<String>) -> Self {
		Self { group: Some(BoundGroup { id, name: name.into() }) }
	}

	/// Decodes a persisted configuration.
	pub fn from_value(value: &serde_json::Value) -> Result<Self> {
		if value.is_null() {
			return Ok(Self::default());
		}

		Ok(Self::deserialize(value).map_err(crate::error::ConfigError::from)?)
	}
}

/// GitLab OAuth 2.0 provider with optional group gating.
#[derive(Clone, Debug)]
pub struct GitLabProvider {
	settings: Arc<Settings>,
	endpoints: ProviderEndpoints,
	config: ProviderConfig,
	api: GitLabApi,
	oauth: OAuthClient,
}
impl GitLabProvider {
	/// Registry key.
	pub const KEY: &'static str = "gitlab";
	/// Display name.
	pub const NAME: &'static str = "GitLab";

	/// Creates a provider whose endpoints derive from the settings' domains.
	pub fn new(settings: Arc<Settings>, config: ProviderConfig) -> Result<Self> {
		let endpoints = ProviderEndpoints::from_settings(&settings)?;

		Self::with_endpoints(settings, endpoints, config)
	}

	/// Creates a provider for explicit endpoints.
	pub fn with_endpoints(
		settings: Arc<Settings>,
		endpoints: ProviderEndpoints,
		config: ProviderConfig,
	) -> Result<Self> {
		let oauth = OAuthClient::new(
			&endpoints,
			&settings.client_id,
			&settings.client_secret,
			ReqwestHttpClient::new()?,
		)?;
		let api = GitLabApi::new(endpoints.api.clone());

		Ok(Self { settings, endpoints, config, api, oauth })
	}

	/// Persisted configuration this provider was built with.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Endpoint set in use.
	pub fn endpoints(&self) -> &ProviderEndpoints {
		&self.endpoints
	}

	/// Token endpoint used to rotate stored tokens.
	pub fn refresh_token_url(&self) -> &Url {
		&self.endpoints.token
	}

	/// Typed variant of [`AuthProvider::build_config`].
	pub fn provider_config(&self, state: &PipelineState) -> ProviderConfig {
		ProviderConfig {
			group: state
				.group()
				.map(|group| BoundGroup { id: group.id.clone(), name: group.name.clone() }),
		}
	}

	fn login_pipeline(&self, kind: PipelineKind) -> Pipeline {
		let verified_only = self.settings.require_verified_email;
		let group = self.config.group.as_ref().map(|group| group.id.clone());

		Pipeline::new(kind)
			.with_step(OAuth2Login::new(
				self.endpoints.authorization.clone(),
				self.settings.client_id.clone(),
				SCOPE,
			))
			.with_step(OAuth2Callback::new(self.oauth.clone()))
			.with_step(
				FetchUser::new(self.api.clone(), group).require_verified_email(verified_only),
			)
			.with_step(ConfirmEmail)
	}

	async fn check_identity(&self, identity: &mut LocalIdentity) -> Result<()> {
		if identity.data.is_expired() {
			let Some(refresh_token) = identity.data.refresh_token.clone() else {
				return Err(IdentityInvalid::new(
					"access token expired and no refresh token is stored",
				)
				.into());
			};
			let rotated = self
				.oauth
				.refresh(&refresh_token)
				.await
				.map_err(|err| IdentityInvalid::caused_by("token refresh failed", err))?;

			identity.data = rotated;
		}

		let client = self.api.open(&identity.data.access_token)?;

		match &self.config.group {
			Some(group) => match client.is_group_member(&group.id).await {
				Ok(true) => Ok(()),
				Ok(false) => Err(IdentityInvalid::new(format!(
					"user is no longer a member of group {}",
					group.name
				))
				.into()),
				Err(err) =>
					Err(IdentityInvalid::caused_by("group membership check failed", err).into()),
			},
			None => match client.get_user().await {
				Ok(user) if user.id == identity.remote_id => Ok(()),
				Ok(user) => Err(IdentityInvalid::new(format!(
					"token now belongs to remote user {} instead of {}",
					user.id, identity.remote_id
				))
				.into()),
				Err(err) => Err(IdentityInvalid::caused_by("liveness check failed", err).into()),
			},
		}
	}
}
impl AuthProvider for GitLabProvider {
	fn key(&self) -> &'static str {
		Self::KEY
	}

	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn auth_pipeline(&self) -> Pipeline {
		self.login_pipeline(PipelineKind::Auth)
	}

	fn setup_pipeline(&self) -> Pipeline {
		self.login_pipeline(PipelineKind::Setup).with_step(SelectGroup::new(self.api.clone()))
	}

	fn build_config(&self, state: &PipelineState) -> Result<serde_json::Value> {
		Ok(serde_json::to_value(self.provider_config(state))
			.map_err(crate::error::ConfigError::from)?)
	}

	fn build_identity(&self, state: &PipelineState) -> Result<LocalIdentity> {
		let user = state.require_user()?;
		let data = state.require_token()?;
		let email = user.email.clone().ok_or(PipelineError::MissingState { key: "user.email" })?;

		Ok(LocalIdentity::new(user.id.clone(), email, user.name.clone(), data.clone()))
	}

	fn refresh_identity<'a>(&'a self, identity: &'a mut LocalIdentity) -> RefreshFuture<'a> {
		Box::pin(async move {
			let span = ObsSpan::refresh(Self::KEY);
			let verdict = span.instrument(self.check_identity(identity)).await;

			obs::record_refresh_outcome(match verdict {
				Ok(()) => RefreshOutcome::Valid,
				Err(_) => RefreshOutcome::Invalid,
			});

			verdict
		})
	}

	fn configure_view(&self) -> View {
		View::Configure
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		api::{RemoteGroup, RemoteUser},
		auth::TokenPayload,
	};

	fn provider(require_verified_email: bool, config: ProviderConfig) -> GitLabProvider {
		let settings = Settings::builder("app-id", "secret", "gitlab.example.com")
			.require_verified_email(require_verified_email)
			.build()
			.expect("Settings should build.");

		GitLabProvider::new(Arc::new(settings), config).expect("Provider should build.")
	}

	#[test]
	fn pipelines_always_confirm_email() {
		let plain = provider(false, ProviderConfig::default());

		assert_eq!(
			plain.auth_pipeline().step_names(),
			["oauth2_login", "oauth2_callback", "fetch_user", "confirm_email"]
		);
		assert_eq!(
			plain.setup_pipeline().step_names(),
			["oauth2_login", "oauth2_callback", "fetch_user", "confirm_email", "select_group"]
		);
		assert_eq!(plain.setup_pipeline().kind(), PipelineKind::Setup);

		let verified = provider(true, ProviderConfig::default());

		assert_eq!(
			verified.auth_pipeline().step_names(),
			["oauth2_login", "oauth2_callback", "fetch_user", "confirm_email"]
		);
		assert_eq!(verified.refresh_token_url().as_str(), "https://gitlab.example.com/oauth/token");
		assert_eq!(verified.configure_view().template(), "auth_gitlab/configure.html");
	}

	#[test]
	fn builds_config_and_identity_from_state() {
		let provider = provider(false, ProviderConfig::default());
		let mut state = PipelineState::default();

		assert_eq!(
			provider.build_config(&state).expect("Empty config should serialize."),
			serde_json::json!({})
		);

		state.bind_token(TokenPayload::new("access").with_refresh_token("refresh"));
		state.bind_user(RemoteUser {
			id: RemoteId::from(42),
			email: Some("ada@example.com".into()),
			name: "Ada".into(),
			username: None,
			confirmed_at: None,
		});
		state.bind_group(RemoteGroup { id: RemoteId::from(5), name: "Platform".into() });

		assert_eq!(
			provider.build_config(&state).expect("Config should serialize."),
			serde_json::json!({ "group": { "id": "5", "name": "Platform" } })
		);

		let identity = provider.build_identity(&state).expect("Identity should build.");

		assert_eq!(identity.remote_id, RemoteId::from(42));
		assert_eq!(identity.email, "ada@example.com");
		assert_eq!(identity.name, "Ada");
		assert_eq!(
			identity.data.refresh_token.as_ref().map(|token| token.expose()),
			Some("refresh")
		);
	}

	#[test]
	fn build_identity_requires_user_and_token() {
		let provider = provider(false, ProviderConfig::default());
		let err = provider
			.build_identity(&PipelineState::default())
			.expect_err("Empty state should not build an identity.");

		assert!(matches!(err, Error::Pipeline(PipelineError::MissingState { key: "user" })));
	}

	#[test]
	fn config_decodes_persisted_json() {
		let config = ProviderConfig::from_value(
			&serde_json::json!({ "group": { "id": 5, "name": "Platform" } }),
		)
		.expect("Config should decode.");

		assert_eq!(config, ProviderConfig::gated(RemoteId::from(5), "Platform"));
		assert_eq!(
			ProviderConfig::from_value(&serde_json::Value::Null).expect("Null should decode."),
			ProviderConfig::default()
		);
		assert!(ProviderConfig::from_value(&serde_json::json!({ "group": "5" })).is_err());
	}
}
