//! Durable binding between a local account and a remote GitLab user.

// self
use crate::{
	_prelude::*,
	auth::{RemoteId, TokenPayload},
};

/// Record the host persists to bind a local account to the remote one.
///
/// `data` keeps the full token payload so later refreshes can reuse (and rotate) the stored
/// credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentity {
	/// Remote user id (the federation key).
	pub remote_id: RemoteId,
	/// Confirmed email address.
	pub email: String,
	/// Display name reported by GitLab.
	pub name: String,
	/// Opaque token data from the OAuth exchange.
	pub data: TokenPayload,
}
impl LocalIdentity {
	/// Creates a new identity record.
	pub fn new(
		remote_id: RemoteId,
		email: impl Into<String>,
		name: impl Into<String>,
		data: TokenPayload,
	) -> Self {
		Self { remote_id, email: email.into(), name: name.into(), data }
	}
}
