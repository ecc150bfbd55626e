mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use auth_gitlab::{
	auth::{LocalIdentity, RemoteId, TokenPayload},
	error::Error,
	pipeline::PipelineState,
	provider::{AuthProvider, ProviderConfig},
};
use common::*;

fn identity(data: TokenPayload) -> LocalIdentity {
	LocalIdentity::new(RemoteId::from(42), "ada@example.com", "Ada Lovelace", data)
}

fn gated() -> ProviderConfig {
	ProviderConfig::gated(RemoteId::from(5), "Platform")
}

async fn mock_group(server: &MockServer, member_ids: &[u64]) {
	let members =
		member_ids.iter().map(|id| json!({ "id": id, "access_level": 30 })).collect::<Vec<_>>();

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/groups/5");
			then.status(200).json_body(json!({ "id": 5, "name": "Platform" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/groups/5/members/all");
			then.status(200).json_body(json!(members));
		})
		.await;
}

async fn mock_user(server: &MockServer, id: u64) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/user").header("authorization", bearer());
			then.status(200).json_body(json!({ "id": id, "name": "Ada", "email": "a@b.com" }));
		})
		.await;
}

fn assert_invalid(result: auth_gitlab::error::Result<()>) {
	match result {
		Err(Error::IdentityInvalid(_)) => {},
		other => panic!("Expected an invalidated identity, got {other:?}."),
	}
}

#[tokio::test]
async fn gated_refresh_accepts_current_members() {
	let server = MockServer::start_async().await;

	mock_group(&server, &[42]).await;
	mock_user(&server, 42).await;

	let provider = provider(&server, gated(), false);
	let mut identity = identity(TokenPayload::new(ACCESS_TOKEN));

	provider.refresh_identity(&mut identity).await.expect("Member identity should stay valid.");

	assert_eq!(identity.data.access_token.expose(), ACCESS_TOKEN);
}

#[tokio::test]
async fn gated_refresh_invalidates_removed_members() {
	let server = MockServer::start_async().await;

	mock_group(&server, &[7]).await;
	mock_user(&server, 42).await;

	let provider = provider(&server, gated(), false);
	let mut identity = identity(TokenPayload::new(ACCESS_TOKEN));

	assert_invalid(provider.refresh_identity(&mut identity).await);
}

#[tokio::test]
async fn gated_refresh_invalidates_on_api_failure() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/groups/5");
			then.status(500).body("upstream unavailable");
		})
		.await;

	let provider = provider(&server, gated(), false);
	let mut identity = identity(TokenPayload::new(ACCESS_TOKEN));
	let err = provider
		.refresh_identity(&mut identity)
		.await
		.expect_err("API failure should invalidate the identity.");
	let invalid = match err {
		Error::IdentityInvalid(invalid) => invalid,
		other => panic!("Expected an invalidated identity, got {other:?}."),
	};

	assert!(invalid.source.is_some());
}

#[tokio::test]
async fn ungated_refresh_compares_remote_user() {
	let server = MockServer::start_async().await;

	mock_user(&server, 42).await;

	let provider = provider(&server, ProviderConfig::default(), false);
	let mut same = identity(TokenPayload::new(ACCESS_TOKEN));

	provider.refresh_identity(&mut same).await.expect("Same remote user should stay valid.");

	let mut other = LocalIdentity::new(
		RemoteId::from(99),
		"eve@example.com",
		"Eve",
		TokenPayload::new(ACCESS_TOKEN),
	);

	assert_invalid(provider.refresh_identity(&mut other).await);
}

#[tokio::test]
async fn built_identity_refreshes_cleanly() {
	let server = MockServer::start_async().await;

	mock_group(&server, &[42]).await;
	mock_user(&server, 42).await;

	let provider = provider(&server, gated(), false);
	let mut state: PipelineState = token_state();

	state.bind_user(remote_user(42, Some("ada@example.com")));

	let mut identity = provider.build_identity(&state).expect("Identity should build.");

	provider.refresh_identity(&mut identity).await.expect("Fresh identity should stay valid.");
}

#[tokio::test]
async fn expired_tokens_rotate_before_checking() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"glpat-rotated\",\"refresh_token\":\"refresh-rotated\",\"token_type\":\"bearer\",\"expires_in\":7200}",
				);
		})
		.await;
	let user = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/user").header("authorization", "Bearer glpat-rotated");
			then.status(200).json_body(json!({ "id": 42, "name": "Ada", "email": "a@b.com" }));
		})
		.await;
	let provider = provider(&server, ProviderConfig::default(), false);
	let expired = TokenPayload::new("glpat-stale")
		.with_refresh_token("refresh-stale")
		.with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(5));
	let mut identity = identity(expired);

	provider.refresh_identity(&mut identity).await.expect("Rotated identity should stay valid.");

	token.assert_async().await;
	user.assert_async().await;

	assert_eq!(identity.data.access_token.expose(), "glpat-rotated");
	assert_eq!(
		identity.data.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("refresh-rotated")
	);
	assert!(!identity.data.is_expired());
}

#[tokio::test]
async fn expired_tokens_without_refresh_invalidate() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let provider = provider(&server, ProviderConfig::default(), false);
	let expired = TokenPayload::new("glpat-stale")
		.with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(5));
	let mut identity = identity(expired);

	assert_invalid(provider.refresh_identity(&mut identity).await);

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_refresh_grant_invalidates() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;

	let provider = provider(&server, ProviderConfig::default(), false);
	let expired = TokenPayload::new("glpat-stale")
		.with_refresh_token("refresh-revoked")
		.with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(5));
	let mut identity = identity(expired);

	assert_invalid(provider.refresh_identity(&mut identity).await);
	assert_eq!(identity.data.access_token.expose(), "glpat-stale");
}
