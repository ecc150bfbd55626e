//! Provider contract consumed by the host, the GitLab provider, and the provider registry.
//!
//! `endpoints` holds the validated GitLab endpoint set, `gitlab` assembles the login/setup
//! pipelines and implements identity materialization and refresh, and `registry` replaces
//! import-time registration with an explicit object populated at startup.

pub mod endpoints;
pub mod gitlab;
pub mod registry;

pub use endpoints::*;
pub use gitlab::*;
pub use registry::*;

// self
use crate::{
	_prelude::*,
	auth::LocalIdentity,
	pipeline::{Pipeline, PipelineState},
	view::View,
};

/// Boxed future returned by [`AuthProvider::refresh_identity`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Contract between an identity provider and the host auth framework.
pub trait AuthProvider
where
	Self: Send + Sync + Debug,
{
	/// Registry key (e.g., `gitlab`).
	fn key(&self) -> &'static str;

	/// Human-readable provider name.
	fn name(&self) -> &'static str;

	/// Steps run on every login.
	fn auth_pipeline(&self) -> Pipeline;

	/// Steps run when an administrator configures the provider.
	fn setup_pipeline(&self) -> Pipeline;

	/// Persisted provider configuration extracted from a completed setup run.
	fn build_config(&self, state: &PipelineState) -> Result<serde_json::Value>;

	/// Identity record extracted from a completed run.
	fn build_identity(&self, state: &PipelineState) -> Result<LocalIdentity>;

	/// Re-validates a linked identity, rotating its stored tokens when needed.
	///
	/// Resolves to [`crate::error::Error::IdentityInvalid`] when the host must force
	/// re-authentication.
	fn refresh_identity<'a>(&'a self, identity: &'a mut LocalIdentity) -> RefreshFuture<'a>;

	/// Static configuration page.
	fn configure_view(&self) -> View;
}
