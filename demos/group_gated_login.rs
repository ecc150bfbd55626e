//! Builds a group-gated GitLab provider from the registry and drives its login pipeline up to the
//! authorize redirect.
//!
//! Reads `GITLAB_*` variables when present and falls back to demo values otherwise.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use serde_json::json;
use url::Url;
// self
use auth_gitlab::{
	auth::AuthProviderId,
	pipeline::{PipelineProgress, StepContext, StepOutcome, StepRequest},
	provider::{AuthProvider, ProviderRegistry},
	settings::Settings,
	store::MemoryIdentityStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let settings = match Settings::from_env() {
		Ok(settings) => settings,
		Err(err) => {
			eprintln!("Falling back to demo settings ({err}).");

			Settings::builder("demo-app", "demo-secret", "gitlab.example.com").build()?
		},
	};
	let registry = ProviderRegistry::with_gitlab(Arc::new(settings))?;
	let provider = registry.build("gitlab", &json!({ "group": { "id": 5, "name": "Platform" } }))?;
	let pipeline = provider.auth_pipeline();

	println!("{} auth pipeline: {}.", provider.name(), pipeline.step_names().join(" -> "));
	println!("Setup pipeline: {}.", provider.setup_pipeline().step_names().join(" -> "));

	let ctx = StepContext::new(
		AuthProviderId::new("org-1-gitlab")?,
		Arc::new(MemoryIdentityStore::default()),
		Url::parse("https://app.example.com/auth/sso/")?,
	);
	let mut session = pipeline.start();

	match pipeline.advance(&mut session, &ctx, &StepRequest::get()).await? {
		PipelineProgress::Halted(StepOutcome::Redirect(url)) => {
			println!("Send your user to {url}.");
			println!("Persist this session until GitLab redirects back with `code` and `state`:");
			println!("{}", serde_json::to_string_pretty(&session)?);
		},
		other => eprintln!("Unexpected first step outcome: {other:?}."),
	}

	Ok(())
}
