//! OAuth token-exchange payload persisted as opaque identity data.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token-endpoint response as stored in pipeline state (`data`) and identity data.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
	/// Bearer credential for the REST API.
	pub access_token: TokenSecret,
	/// Refresh credential, when GitLab issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the provider (normally `bearer`).
	pub token_type: String,
	/// Scopes granted, space-delimited, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Instant the token was received.
	#[serde(with = "time::serde::timestamp")]
	pub issued_at: OffsetDateTime,
	/// Expiry instant, when the provider reported `expires_in`.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenPayload {
	/// Creates a payload holding only an access token issued now.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			token_type: "bearer".into(),
			scope: None,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Sets the expiry relative to `issued_at`.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_at = Some(self.issued_at + expires_in);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
		self.expires_at = Some(expires_at);

		self
	}

	/// Returns `true` if the token has expired at `instant`; tokens without expiry never do.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token has expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for TokenPayload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPayload")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn expiry_is_optional() {
		let payload = TokenPayload::new("access");

		assert!(!payload.is_expired());

		let expired = TokenPayload::new("access").with_expires_in(Duration::seconds(-1));

		assert!(expired.is_expired());
	}

	#[test]
	fn debug_output_redacts_tokens() {
		let payload = TokenPayload::new("access-secret").with_refresh_token("refresh-secret");
		let rendered = format!("{payload:?}");

		assert!(!rendered.contains("access-secret"));
		assert!(!rendered.contains("refresh-secret"));
	}

	#[test]
	fn payload_survives_json_persistence() {
		let payload = TokenPayload::new("access")
			.with_refresh_token("refresh")
			.with_expires_in(Duration::hours(2));
		let json = serde_json::to_value(&payload).expect("Payload should serialize.");

		assert_eq!(json["access_token"], "access");
		assert_eq!(json["refresh_token"], "refresh");

		let restored: TokenPayload =
			serde_json::from_value(json).expect("Payload should deserialize.");

		assert_eq!(restored.access_token.expose(), "access");
		assert_eq!(
			restored.expires_at.map(OffsetDateTime::unix_timestamp),
			payload.expires_at.map(OffsetDateTime::unix_timestamp)
		);
	}
}
