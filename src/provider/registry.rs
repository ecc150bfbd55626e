//! Explicit provider registry populated during process start.

// self
use crate::{
	_prelude::*,
	provider::{AuthProvider, GitLabProvider, ProviderConfig, ProviderEndpoints},
	settings::Settings,
};

/// Registry failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RegistryError {
	/// A factory is already registered under the key.
	#[error("Provider `{key}` is already registered.")]
	Duplicate {
		/// Conflicting key.
		key: String,
	},
	/// No factory is registered under the key.
	#[error("Provider `{key}` is not registered.")]
	Unknown {
		/// Requested key.
		key: String,
	},
}

/// Builds configured provider instances from persisted configuration.
pub trait ProviderFactory
where
	Self: Send + Sync + Debug,
{
	/// Builds a provider for one configured instance.
	fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn AuthProvider>>;
}

/// Factory for [`GitLabProvider`] instances sharing one set of settings.
#[derive(Clone, Debug)]
pub struct GitLabProviderFactory {
	settings: Arc<Settings>,
	endpoints: ProviderEndpoints,
}
impl GitLabProviderFactory {
	/// Creates a factory whose endpoints derive from the settings' domains.
	pub fn new(settings: Arc<Settings>) -> Result<Self> {
		let endpoints = ProviderEndpoints::from_settings(&settings)?;

		Ok(Self { settings, endpoints })
	}

	/// Creates a factory for explicit endpoints.
	pub fn with_endpoints(settings: Arc<Settings>, endpoints: ProviderEndpoints) -> Self {
		Self { settings, endpoints }
	}
}
impl ProviderFactory for GitLabProviderFactory {
	fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn AuthProvider>> {
		let provider = GitLabProvider::with_endpoints(
			self.settings.clone(),
			self.endpoints.clone(),
			ProviderConfig::from_value(config)?,
		)?;

		Ok(Arc::new(provider))
	}
}

/// Provider factories keyed by provider key.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
	factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry with the GitLab factory under [`GitLabProvider::KEY`].
	pub fn with_gitlab(settings: Arc<Settings>) -> Result<Self> {
		let mut registry = Self::new();

		registry.register(GitLabProvider::KEY, GitLabProviderFactory::new(settings)?)?;

		Ok(registry)
	}

	/// Registers `factory` under `key`; keys are unique.
	pub fn register(
		&mut self,
		key: impl Into<String>,
		factory: impl 'static + ProviderFactory,
	) -> Result<(), RegistryError> {
		let key = key.into();

		if self.factories.contains_key(&key) {
			return Err(RegistryError::Duplicate { key });
		}

		self.factories.insert(key, Arc::new(factory));

		Ok(())
	}

	/// Returns `true` when `key` is registered.
	pub fn contains(&self, key: &str) -> bool {
		self.factories.contains_key(key)
	}

	/// Registered keys in order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.factories.keys().map(String::as_str)
	}

	/// Builds the provider registered under `key` for a persisted configuration.
	pub fn build(&self, key: &str, config: &serde_json::Value) -> Result<Arc<dyn AuthProvider>> {
		let factory = self
			.factories
			.get(key)
			.ok_or_else(|| RegistryError::Unknown { key: key.to_owned() })?;

		factory.build(config)
	}
}
