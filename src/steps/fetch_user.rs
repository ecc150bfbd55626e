//! Loads the remote user and enforces the group and email policies.

// self
use crate::{
	_prelude::*,
	api::GitLabApi,
	auth::RemoteId,
	error::PolicyError,
	pipeline::{PipelineState, PipelineStep, StepContext, StepFuture, StepOutcome, StepRequest},
};

/// Fetches the authenticated user and binds it as `user`.
///
/// With a bound group the membership check runs first and a non-member halts before `GET /user`
/// is issued. API failures abort the run.
#[derive(Clone, Debug)]
pub struct FetchUser {
	api: GitLabApi,
	group: Option<RemoteId>,
	require_verified_email: bool,
}
impl FetchUser {
	/// Creates the step; `group` gates access when present.
	pub fn new(api: GitLabApi, group: Option<RemoteId>) -> Self {
		Self { api, group, require_verified_email: false }
	}

	/// Rejects accounts whose email GitLab has not confirmed.
	pub fn require_verified_email(mut self, required: bool) -> Self {
		self.require_verified_email = required;

		self
	}
}
impl PipelineStep for FetchUser {
	fn name(&self) -> &'static str {
		"fetch_user"
	}

	fn handle<'a>(
		&'a self,
		_ctx: &'a StepContext,
		_request: &'a StepRequest,
		state: &'a mut PipelineState,
	) -> StepFuture<'a> {
		Box::pin(async move {
			let client = self.api.open(state.access_token()?)?;

			let is_member = match &self.group {
				Some(group) => client.is_group_member(group).await?,
				None => true,
			};

			if !is_member {
				return Ok(PolicyError::NoGroupAccess.into());
			}

			let user = client.get_user().await?;

			if user.email().is_none() {
				return Ok(PolicyError::NoEmail.into());
			}
			if self.require_verified_email && !user.is_confirmed() {
				return Ok(PolicyError::UnverifiedEmail.into());
			}

			state.bind_user(user);

			Ok(StepOutcome::Next)
		})
	}
}
