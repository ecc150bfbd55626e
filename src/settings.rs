//! Process-wide provider settings loaded once at startup.
//!
//! Values come from `GITLAB_*` environment variables (through the `config` crate) or from any
//! prepared [`config::Config`] source, and are shared immutably as `Arc<Settings>` afterwards.

// crates.io
use config::{Config, Environment};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Scope string requested during authorization.
pub const SCOPE: &str = "read_user read_api";

const ENV_PREFIX: &str = "GITLAB";

/// Static GitLab OAuth application settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
	/// OAuth application id.
	#[serde(rename = "app_id")]
	pub client_id: String,
	/// OAuth application secret.
	#[serde(rename = "api_secret")]
	pub client_secret: TokenSecret,
	/// Host serving the OAuth endpoints (e.g., `gitlab.com`).
	pub base_domain: String,
	/// Host serving the REST API; defaults to [`Settings::base_domain`].
	#[serde(default)]
	pub api_domain: Option<String>,
	/// Only accept accounts whose email GitLab has confirmed.
	#[serde(default)]
	pub require_verified_email: bool,
}
impl Settings {
	/// Starts a builder for programmatic configuration.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		base_domain: impl Into<String>,
	) -> SettingsBuilder {
		SettingsBuilder::new(client_id, client_secret, base_domain)
	}

	/// Loads settings from `GITLAB_APP_ID`, `GITLAB_API_SECRET`, `GITLAB_BASE_DOMAIN`,
	/// `GITLAB_API_DOMAIN`, and `GITLAB_REQUIRE_VERIFIED_EMAIL`.
	///
	/// Values are kept as strings until deserialization, so numeric-looking credentials such as
	/// `00123` survive unchanged.
	pub fn from_env() -> Result<Self> {
		Self::from_environment(Environment::with_prefix(ENV_PREFIX))
	}

	fn from_environment(environment: Environment) -> Result<Self> {
		let source =
			Config::builder().add_source(environment).build().map_err(ConfigError::from)?;

		Self::from_config(source)
	}

	/// Deserializes settings from a prepared [`Config`].
	pub fn from_config(source: Config) -> Result<Self> {
		let settings = source.try_deserialize::<Self>().map_err(ConfigError::from)?;

		settings.validate()?;

		Ok(settings)
	}

	/// Returns the REST API host.
	pub fn api_domain(&self) -> &str {
		self.api_domain.as_deref().filter(|domain| !domain.is_empty()).unwrap_or(&self.base_domain)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::EmptySetting { name: "app_id" });
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::EmptySetting { name: "api_secret" });
		}
		if self.base_domain.trim().is_empty() {
			return Err(ConfigError::EmptySetting { name: "base_domain" });
		}

		Ok(())
	}
}

/// Builder for [`Settings`].
#[derive(Debug)]
pub struct SettingsBuilder {
	settings: Settings,
}
impl SettingsBuilder {
	fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		base_domain: impl Into<String>,
	) -> Self {
		Self {
			settings: Settings {
				client_id: client_id.into(),
				client_secret: TokenSecret::new(client_secret),
				base_domain: base_domain.into(),
				api_domain: None,
				require_verified_email: false,
			},
		}
	}

	/// Serves the REST API from a different host.
	pub fn api_domain(mut self, domain: impl Into<String>) -> Self {
		self.settings.api_domain = Some(domain.into());

		self
	}

	/// Toggles the verified-email policy.
	pub fn require_verified_email(mut self, required: bool) -> Self {
		self.settings.require_verified_email = required;

		self
	}

	/// Validates and returns the settings.
	pub fn build(self) -> Result<Settings, ConfigError> {
		self.settings.validate()?;

		Ok(self.settings)
	}
}
