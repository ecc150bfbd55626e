//! Thread-safe in-memory [`IdentityStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AuthProviderId, LocalIdentity, RemoteId},
	store::{IdentityStore, StoreError, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, LocalIdentity>>>;

/// Identity store that keeps records in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryIdentityStore(StoreMap);
impl MemoryIdentityStore {
	/// Returns the number of linked identities.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no identity is linked.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn find_now(map: StoreMap, key: StoreKey) -> Option<LocalIdentity> {
		map.read().get(&key).cloned()
	}

	fn save_now(map: StoreMap, key: StoreKey, identity: LocalIdentity) -> Result<(), StoreError> {
		map.write().insert(key, identity);

		Ok(())
	}

	fn remove_now(map: StoreMap, key: StoreKey) -> Option<LocalIdentity> {
		map.write().remove(&key)
	}
}
impl IdentityStore for MemoryIdentityStore {
	fn find<'a>(
		&'a self,
		provider: &'a AuthProviderId,
		remote_id: &'a RemoteId,
	) -> StoreFuture<'a, Option<LocalIdentity>> {
		let map = self.0.clone();
		let key = StoreKey::new(provider, remote_id);

		Box::pin(async move { Ok(Self::find_now(map, key)) })
	}

	fn save<'a>(
		&'a self,
		provider: &'a AuthProviderId,
		identity: LocalIdentity,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = StoreKey::new(provider, &identity.remote_id);

		Box::pin(async move { Self::save_now(map, key, identity) })
	}

	fn remove<'a>(
		&'a self,
		provider: &'a AuthProviderId,
		remote_id: &'a RemoteId,
	) -> StoreFuture<'a, Option<LocalIdentity>> {
		let map = self.0.clone();
		let key = StoreKey::new(provider, remote_id);

		Box::pin(async move { Ok(Self::remove_now(map, key)) })
	}
}
