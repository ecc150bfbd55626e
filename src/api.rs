//! Authenticated client for the slice of the GitLab REST API the pipeline needs.
//!
//! [`GitLabApi`] is the long-lived, token-free connector a provider holds. Every step or refresh
//! call opens its own [`GitLabClient`] with [`GitLabApi::open`]; the client owns its connection
//! pool and releases it when dropped, whichever way the caller exits.
//!
//! Requests carry `Authorization: Bearer <token>`, expect JSON, time out after
//! [`REQUEST_TIMEOUT`], and are never retried. Failures surface as [`ApiError`] whose `status`
//! is the HTTP status of the error response, or `0` when no response arrived.

pub mod model;
pub use model::*;

// crates.io
use reqwest::{
	StatusCode,
	header::{ACCEPT, HeaderValue},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{RemoteId, TokenSecret},
	error::ApiError,
	http::{REQUEST_TIMEOUT, ReqwestHttpClient},
};

/// Connector that opens token-scoped [`GitLabClient`] sessions against one API root.
#[derive(Clone, Debug)]
pub struct GitLabApi {
	base: Url,
	http_client: Option<ReqwestHttpClient>,
}
impl GitLabApi {
	/// Creates a connector for the API root (e.g., `https://gitlab.com/api/v4/`).
	///
	/// The root is normalized to end with `/` so relative paths append instead of replacing the
	/// last segment.
	pub fn new(mut base: Url) -> Self {
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());

			base.set_path(&path);
		}

		Self { base, http_client: None }
	}

	/// Shares an existing HTTP client between sessions instead of building one per session.
	pub fn with_http_client(mut self, http_client: ReqwestHttpClient) -> Self {
		self.http_client = Some(http_client);

		self
	}

	/// Returns the normalized API root.
	pub fn base_url(&self) -> &Url {
		&self.base
	}

	/// Opens a session authenticated with `access_token`.
	pub fn open(&self, access_token: &TokenSecret) -> Result<GitLabClient> {
		let http_client = match &self.http_client {
			Some(shared) => shared.clone(),
			None => ReqwestHttpClient::new()?,
		};

		Ok(GitLabClient { base: self.base.clone(), access_token: access_token.clone(), http_client })
	}
}

/// Token-scoped GitLab API session.
pub struct GitLabClient {
	base: Url,
	access_token: TokenSecret,
	http_client: ReqwestHttpClient,
}
impl GitLabClient {
	/// Fetches the authenticated user (`GET /user`).
	pub async fn get_user(&self) -> Result<RemoteUser, ApiError> {
		self.get(&["user"], &[]).await
	}

	/// Fetches a single group (`GET /groups/{id}`).
	pub async fn get_group(&self, group_id: &RemoteId) -> Result<RemoteGroup, ApiError> {
		self.get(&["groups", group_id.as_str()], &[]).await
	}

	/// Lists groups the user belongs to with at least `min_access_level`
	/// (`GET /groups?min_access_level=N`).
	pub async fn list_user_groups(
		&self,
		min_access_level: AccessLevel,
	) -> Result<Vec<RemoteGroup>, ApiError> {
		let level = min_access_level.to_string();

		self.get(&["groups"], &[("min_access_level", level.as_str())]).await
	}

	/// Lists direct and inherited members of a group (`GET /groups/{id}/members/all`).
	pub async fn list_group_members(
		&self,
		group_id: &RemoteId,
	) -> Result<Vec<RemoteMember>, ApiError> {
		self.get(&["groups", group_id.as_str(), "members", "all"], &[]).await
	}

	/// Checks whether the authenticated user is a member of `group_id`.
	///
	/// Fetches the group, then its full member list, then the current user, and scans the list
	/// for the user's id. A `404` from any of those calls means "not a member"; every other
	/// failure propagates.
	pub async fn is_group_member(&self, group_id: &RemoteId) -> Result<bool, ApiError> {
		let membership = async {
			self.get_group(group_id).await?;

			let members = self.list_group_members(group_id).await?;
			let user = self.get_user().await?;

			Ok::<_, ApiError>(members.iter().any(|member| member.id == user.id))
		};

		match membership.await {
			Ok(is_member) => Ok(is_member),
			Err(err) if err.is_not_found() => Ok(false),
			Err(err) => Err(err),
		}
	}

	fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
		let mut url = self.base.clone();

		url.path_segments_mut()
			.map_err(|_| ApiError::transport(format!("API root {} cannot carry a path.", self.base)))?
			.pop_if_empty()
			.extend(segments);

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}

	async fn get<T>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T, ApiError>
	where
		T: DeserializeOwned,
	{
		let url = self.endpoint(segments, query)?;
		let response = self
			.http_client
			.get(url.clone())
			.bearer_auth(self.access_token.expose())
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|err| request_failed(&url, err))?;
		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();

			return Err(ApiError::new(
				format!("GitLab API request failed: {} returned {status}: {body}", url.path()),
				status.as_u16(),
			));
		}

		let body = response.bytes().await.map_err(|err| request_failed(&url, err))?;

		decode(&url, status, &body)
	}
}
impl Debug for GitLabClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GitLabClient")
			.field("base", &self.base.as_str())
			.field("access_token", &self.access_token)
			.finish()
	}
}

fn request_failed(url: &Url, err: ReqwestError) -> ApiError {
	let status = err.status().map_or(ApiError::TRANSPORT_STATUS, |status| status.as_u16());

	ApiError::new(format!("Request failed: {} ({err}).", url.path()), status)
}

fn decode<T>(url: &Url, status: StatusCode, body: &[u8]) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
		ApiError::new(
			format!("GitLab API returned malformed JSON for {} at `{}`.", url.path(), err.path()),
			status.as_u16(),
		)
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn client(base: &str) -> GitLabClient {
		GitLabApi::new(Url::parse(base).expect("API root fixture should parse."))
			.open(&TokenSecret::new("token"))
			.expect("Client should open.")
	}

	#[test]
	fn endpoints_append_to_versioned_root() {
		let client = client("https://gitlab.example.com/api/v4");
		let url = client
			.endpoint(&["groups", "42", "members", "all"], &[])
			.expect("Endpoint should build.");

		assert_eq!(url.as_str(), "https://gitlab.example.com/api/v4/groups/42/members/all");

		let url = client
			.endpoint(&["groups"], &[("min_access_level", "10")])
			.expect("Endpoint should build.");

		assert_eq!(url.as_str(), "https://gitlab.example.com/api/v4/groups?min_access_level=10");
	}

	#[test]
	fn group_paths_are_percent_encoded() {
		let client = client("https://gitlab.example.com/api/v4/");
		let id = RemoteId::new("acme/platform").expect("Group path fixture should be valid.");
		let url = client.endpoint(&["groups", id.as_str()], &[]).expect("Endpoint should build.");

		assert_eq!(url.as_str(), "https://gitlab.example.com/api/v4/groups/acme%2Fplatform");
	}

	#[test]
	fn decode_reports_path_and_status() {
		let url = Url::parse("https://gitlab.example.com/api/v4/user")
			.expect("URL fixture should parse.");
		let err = decode::<RemoteUser>(&url, StatusCode::OK, br#"{"id": true}"#)
			.expect_err("Malformed payload should fail.");

		assert_eq!(err.status, 200);
		assert!(err.message.contains("`id`"));
	}

	#[test]
	fn debug_output_redacts_token() {
		let rendered = format!("{:?}", client("https://gitlab.example.com/api/v4/"));

		assert!(!rendered.contains("\"token\""));
		assert!(rendered.contains("<redacted>"));
	}
}
