//! Wire models returned by the GitLab REST API.
//!
//! Only the fields the pipeline reads are modeled; everything else in the response is ignored.

// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::{_prelude::*, auth::RemoteId};

/// Authenticated user as reported by `GET /user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
	/// Stable federation key.
	pub id: RemoteId,
	/// Primary email; blank values are treated as missing.
	#[serde(default, deserialize_with = "blank_as_none")]
	pub email: Option<String>,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Login handle.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// When GitLab confirmed the primary email, if ever.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub confirmed_at: Option<String>,
}
impl RemoteUser {
	/// Returns the email when one is present.
	pub fn email(&self) -> Option<&str> {
		self.email.as_deref()
	}

	/// Returns `true` when GitLab reports a confirmed email address.
	pub fn is_confirmed(&self) -> bool {
		self.confirmed_at.as_deref().is_some_and(|value| !value.trim().is_empty())
	}
}

/// Group as reported by `GET /groups` and `GET /groups/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGroup {
	/// Group id.
	pub id: RemoteId,
	/// Human-readable group name.
	pub name: String,
}

/// Entry of a group member listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMember {
	/// Remote user id of the member.
	pub id: RemoteId,
	/// Login handle.
	#[serde(default)]
	pub username: Option<String>,
	/// Effective access level as reported by GitLab.
	#[serde(default)]
	pub access_level: Option<u8>,
}

/// GitLab role thresholds used by the `min_access_level` filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
	/// Guest (10), the lowest level that makes a group visible as "joined".
	#[default]
	Guest,
	/// Reporter (20).
	Reporter,
	/// Developer (30).
	Developer,
	/// Maintainer (40).
	Maintainer,
	/// Owner (50).
	Owner,
}
impl AccessLevel {
	/// Numeric level understood by the REST API.
	pub fn as_u8(self) -> u8 {
		match self {
			AccessLevel::Guest => 10,
			AccessLevel::Reporter => 20,
			AccessLevel::Developer => 30,
			AccessLevel::Maintainer => 40,
			AccessLevel::Owner => 50,
		}
	}
}
impl Display for AccessLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.as_u8())
	}
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer).map_err(D::Error::custom)?;

	Ok(value.filter(|email| !email.trim().is_empty()))
}
