//! Typed session state shared by the steps of one pipeline run.

// self
use crate::{
	_prelude::*,
	api::{RemoteGroup, RemoteUser},
	auth::{TokenPayload, TokenSecret},
	error::PipelineError,
};

/// Authorization request issued by the login step and awaited by the callback step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
	/// Opaque `state` value that must round-trip through the provider redirect.
	pub state: String,
	/// PKCE verifier matching the challenge sent to the provider.
	pub pkce_verifier: TokenSecret,
	/// Redirect URI sent with the authorization request.
	pub redirect_uri: Url,
}

/// State bag of one pipeline run, persisted by the host between requests.
///
/// Each slot has exactly one writer step: the login step writes `authorization`, the callback
/// writes `data`, the user fetch writes `user` (which email confirmation may amend), and group
/// selection writes `group`. Reading a slot no earlier step wrote yields
/// [`PipelineError::MissingState`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	authorization: Option<PendingAuthorization>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	data: Option<TokenPayload>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	user: Option<RemoteUser>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	group: Option<RemoteGroup>,
}
impl PipelineState {
	/// Pending authorization request, if the login step ran.
	pub fn authorization(&self) -> Option<&PendingAuthorization> {
		self.authorization.as_ref()
	}

	/// Records the pending authorization request.
	pub fn bind_authorization(&mut self, authorization: PendingAuthorization) {
		self.authorization = Some(authorization);
	}

	/// Removes and returns the pending authorization so it can only be redeemed once.
	pub fn take_authorization(&mut self) -> Option<PendingAuthorization> {
		self.authorization.take()
	}

	/// Token payload from the code exchange, if bound.
	pub fn token(&self) -> Option<&TokenPayload> {
		self.data.as_ref()
	}

	/// Token payload from the code exchange.
	pub fn require_token(&self) -> Result<&TokenPayload, PipelineError> {
		self.data.as_ref().ok_or(PipelineError::MissingState { key: "data" })
	}

	/// Binds the token payload.
	pub fn bind_token(&mut self, data: TokenPayload) {
		self.data = Some(data);
	}

	/// Remote user, if bound.
	pub fn user(&self) -> Option<&RemoteUser> {
		self.user.as_ref()
	}

	/// Remote user fetched earlier in the run.
	pub fn require_user(&self) -> Result<&RemoteUser, PipelineError> {
		self.user.as_ref().ok_or(PipelineError::MissingState { key: "user" })
	}

	/// Mutable access to the remote user fetched earlier in the run.
	pub fn require_user_mut(&mut self) -> Result<&mut RemoteUser, PipelineError> {
		self.user.as_mut().ok_or(PipelineError::MissingState { key: "user" })
	}

	/// Binds the remote user.
	pub fn bind_user(&mut self, user: RemoteUser) {
		self.user = Some(user);
	}

	/// Selected group, if bound.
	pub fn group(&self) -> Option<&RemoteGroup> {
		self.group.as_ref()
	}

	/// Group selected during setup.
	pub fn require_group(&self) -> Result<&RemoteGroup, PipelineError> {
		self.group.as_ref().ok_or(PipelineError::MissingState { key: "group" })
	}

	/// Binds the selected group.
	pub fn bind_group(&mut self, group: RemoteGroup) {
		self.group = Some(group);
	}

	/// Returns the access token used to open API sessions.
	pub(crate) fn access_token(&self) -> Result<&TokenSecret, PipelineError> {
		self.require_token().map(|data| &data.access_token)
	}
}
