//! Lookup contract for identities the host already linked, plus an in-memory implementation.

pub mod memory;

pub use memory::MemoryIdentityStore;

// self
use crate::{
	_prelude::*,
	auth::{AuthProviderId, LocalIdentity, RemoteId},
};

/// Boxed future returned by [`IdentityStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Host-side storage of [`LocalIdentity`] records, keyed by provider instance and remote id.
///
/// Pipeline steps only ever call [`IdentityStore::find`]; `save` and `remove` exist so hosts and
/// tests can use the same contract when materializing or invalidating identities.
pub trait IdentityStore
where
	Self: Send + Sync,
{
	/// Looks up the identity linked to `remote_id` under `provider`.
	fn find<'a>(
		&'a self,
		provider: &'a AuthProviderId,
		remote_id: &'a RemoteId,
	) -> StoreFuture<'a, Option<LocalIdentity>>;

	/// Creates or replaces the identity linked under `provider`.
	fn save<'a>(
		&'a self,
		provider: &'a AuthProviderId,
		identity: LocalIdentity,
	) -> StoreFuture<'a, ()>;

	/// Removes the linked identity, returning it when present.
	fn remove<'a>(
		&'a self,
		provider: &'a AuthProviderId,
		remote_id: &'a RemoteId,
	) -> StoreFuture<'a, Option<LocalIdentity>>;
}

/// Error type produced by [`IdentityStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Stored record could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key of a linked identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Configured provider instance.
	pub provider: AuthProviderId,
	/// Remote user id.
	pub remote_id: RemoteId,
}
impl StoreKey {
	/// Builds a key from its parts.
	pub fn new(provider: &AuthProviderId, remote_id: &RemoteId) -> Self {
		Self { provider: provider.clone(), remote_id: remote_id.clone() }
	}
}
