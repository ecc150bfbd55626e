//! Token-endpoint facade over the `oauth2` crate.
//!
//! [`OAuthClient`] performs the authorization-code exchange (with PKCE) and the refresh-token
//! grant, turning successful responses into [`TokenPayload`] values and failures into the crate
//! error taxonomy.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, PkceCodeVerifier, RedirectUrl, RefreshToken, RequestTokenError,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenPayload, TokenSecret},
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ProviderEndpoints,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Grants the facade performs, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantType {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Confidential OAuth client bound to the provider's token endpoint.
///
/// The client secret travels in the request body, matching how GitLab documents its token
/// endpoint.
#[derive(Clone)]
pub struct OAuthClient {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl OAuthClient {
	/// Builds a client for the given endpoints and credentials.
	pub fn new(
		endpoints: &ProviderEndpoints,
		client_id: &str,
		client_secret: &TokenSecret,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client })
	}

	/// Exchanges an authorization code (plus PKCE verifier) for tokens.
	pub async fn exchange_code(
		&self,
		code: &str,
		pkce_verifier: &TokenSecret,
		redirect_uri: &Url,
	) -> Result<TokenPayload> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.expose().to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::AuthorizationCode, meta.take(), err))?;

		map_token_response(response, None)
	}

	/// Rotates tokens with the refresh-token grant.
	///
	/// GitLab may omit a new refresh token; the previous one is carried over in that case.
	pub async fn refresh(&self, refresh_token: &TokenSecret) -> Result<TokenPayload> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::RefreshToken, meta.take(), err))?;

		map_token_response(response, Some(refresh_token))
	}
}
impl Debug for OAuthClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("client_id", self.oauth_client.client_id())
			.field("token_url", &self.oauth_client.token_uri().as_str())
			.finish()
	}
}

/// Coarse classification of token-endpoint failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenErrorKind {
	/// Provider rejected the authorization grant (bad code/refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Failure is temporary.
	Transient,
}

/// Classifies a token-endpoint failure from its OAuth `error` code, description, and status.
pub fn classify_token_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
	status: Option<u16>,
) -> TokenErrorKind {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_description))
		.unwrap_or_else(|| classify_status(status))
}

fn match_exact_value(value: &str) -> Option<TokenErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("access_denied")
		|| value.eq_ignore_ascii_case("invalid_scope")
	{
		Some(TokenErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(TokenErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(TokenErrorKind::Transient)
	} else {
		None
	}
}

fn match_description(description: &str) -> Option<TokenErrorKind> {
	let lowered = description.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(TokenErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(TokenErrorKind::InvalidClient),
		text if text.contains("temporarily_unavailable") => Some(TokenErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> TokenErrorKind {
	match status {
		Some(400 | 404 | 410) => TokenErrorKind::InvalidGrant,
		Some(401 | 403) => TokenErrorKind::InvalidClient,
		_ => TokenErrorKind::Transient,
	}
}

fn map_token_response(
	response: BasicTokenResponse,
	previous_refresh: Option<&TokenSecret>,
) -> Result<TokenPayload> {
	let mut payload = TokenPayload::new(response.access_token().secret().to_owned());

	payload.token_type = response.token_type().as_ref().to_owned();
	payload.scope = response.scopes().map(|scopes| {
		scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
	});
	payload.refresh_token = response
		.refresh_token()
		.map(|token| TokenSecret::new(token.secret().to_owned()))
		.or_else(|| previous_refresh.cloned());

	if let Some(expires_in) = response.expires_in() {
		let secs =
			i64::try_from(expires_in.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		payload = payload.with_expires_in(Duration::seconds(secs));
	}

	Ok(payload)
}

fn map_request_error(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, response, meta_ref),
		RequestTokenError::Request(error) => map_transport_error(grant, meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message: format!("{grant} grant failed: {message}"),
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	grant: GrantType,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_string();
	let description = response.error_description().map(String::as_str);
	let message = match description {
		Some(description) => format!("{grant} grant returned an OAuth error: {description}"),
		None => format!("{grant} grant returned an OAuth error: {code}"),
	};

	match classify_token_error(Some(&code), description, meta_status(meta)) {
		TokenErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		TokenErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		TokenErrorKind::Transient => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_transport_error(
	grant: GrantType,
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<ReqwestError>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => {
			if inner.is_builder() {
				return ConfigError::from(*inner).into();
			}
			if inner.is_timeout() {
				return TransientError::TokenEndpoint {
					message: format!("{grant} grant timed out"),
					status: meta_status(meta),
					retry_after: meta_retry_after(meta),
				}
				.into();
			}

			TransportError::from(*inner).into()
		},
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::TokenEndpoint {
			message: format!("HTTP client error during the {grant} grant: {message}"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => TransientError::TokenEndpoint {
			message: format!("HTTP client error during the {grant} grant"),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
