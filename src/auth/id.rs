//! Strongly typed identifiers for provider instances and remote accounts.

// std
use std::borrow::Borrow;
// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Host-assigned identifier of a configured provider instance (the `provider_model` of a run).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthProviderId(String);
impl AuthProviderId {
	/// Creates a provider id; empty, whitespace-bearing, or overlong values are rejected.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		Self::try_from(value.into())
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for AuthProviderId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view("AuthProvider", &value)?;

		Ok(Self(value))
	}
}
impl From<AuthProviderId> for String {
	fn from(value: AuthProviderId) -> Self {
		value.0
	}
}
impl AsRef<str> for AuthProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for AuthProviderId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for AuthProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AuthProvider({})", self.0)
	}
}
impl Display for AuthProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Stable federation key of a remote GitLab user or group.
///
/// GitLab reports numeric ids while groups may also be addressed by their full path, so the key
/// accepts either a JSON number or a string and always compares in its string form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RemoteId(String);
impl RemoteId {
	/// Creates a remote id from its textual form.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view("Remote", view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl From<u64> for RemoteId {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}
impl AsRef<str> for RemoteId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for RemoteId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Remote({})", self.0)
	}
}
impl Display for RemoteId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for RemoteId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl<'de> Deserialize<'de> for RemoteId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Number(u64),
			Text(String),
		}

		match Raw::deserialize(deserializer)? {
			Raw::Number(value) => Ok(Self::from(value)),
			Raw::Text(value) => Self::new(value).map_err(D::Error::custom),
		}
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
