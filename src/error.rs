//! Crate-level error types shared across the API client, pipeline steps, and providers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message shown when the user is not a member of the bound group.
pub const ERR_NO_GROUP_ACCESS: &str = "You do not have access to the required GitLab group.";
/// Message shown when no usable email address could be determined.
pub const ERR_NO_EMAIL: &str =
	"We were unable to find an email address associated with your GitLab account.";
/// Message shown when the verified-email policy rejects the account.
pub const ERR_UNVERIFIED_EMAIL: &str =
	"The email address associated with your GitLab account has not been verified.";

/// Canonical error exposed by public APIs.
///
/// Any variant returned from a pipeline step aborts the run; user-facing halts are modeled as
/// [`HaltError`] values inside [`crate::pipeline::StepOutcome`] instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Remote GitLab API call failed.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Pipeline state or cursor is inconsistent.
	#[error(transparent)]
	Pipeline(#[from] PipelineError),
	/// Identity store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Provider registry lookup or registration failed.
	#[error(transparent)]
	Registry(#[from] crate::provider::RegistryError),
	/// Linked identity no longer satisfies the provider policy.
	#[error(transparent)]
	IdentityInvalid(#[from] IdentityInvalid),
	/// Temporary token endpoint failure.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS) while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider rejected the grant (e.g., bad code or refresh token).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or crate-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or crate-supplied reason string.
		reason: String,
	},
}

/// Failure reported by the remote GitLab REST API.
///
/// `status` holds the HTTP status of an error response, or `0` when no response was received
/// (DNS, connect, TLS, timeout). A successful (2xx) response whose body cannot be decoded keeps
/// its 2xx status; [`ApiError::is_malformed`] tells that case apart from a rejected request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct ApiError {
	/// Human-readable failure summary.
	pub message: String,
	/// HTTP status code, `0` for transport-level failures, 2xx for undecodable bodies.
	pub status: u16,
}
impl ApiError {
	/// Status used for failures that never produced an HTTP response.
	pub const TRANSPORT_STATUS: u16 = 0;

	/// Creates a new API error.
	pub fn new(message: impl Into<String>, status: u16) -> Self {
		Self { message: message.into(), status }
	}

	/// Builds an error for a request that never produced a response.
	pub fn transport(message: impl Into<String>) -> Self {
		Self::new(message, Self::TRANSPORT_STATUS)
	}

	/// Returns `true` when no HTTP response was received.
	pub fn is_transport(&self) -> bool {
		self.status == Self::TRANSPORT_STATUS
	}

	/// Returns `true` when a 2xx response carried a body that could not be decoded.
	pub fn is_malformed(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for `404 Not Found` responses.
	pub fn is_not_found(&self) -> bool {
		self.status == 404
	}
}

/// Authorization policy violations that halt a pipeline with a user-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum PolicyError {
	/// User is not a member of the bound group.
	#[error("{}", ERR_NO_GROUP_ACCESS)]
	NoGroupAccess,
	/// No email address could be determined for the user.
	#[error("{}", ERR_NO_EMAIL)]
	NoEmail,
	/// Verified-email policy is enabled and the account is unconfirmed.
	#[error("{}", ERR_UNVERIFIED_EMAIL)]
	UnverifiedEmail,
}

/// Problems with the authorization redirect that halt the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CallbackError {
	/// Provider reported an authorization error (e.g., the user denied access).
	#[error("GitLab did not authorize the request: {reason}.")]
	Denied {
		/// Provider-supplied `error_description` or `error` value.
		reason: String,
	},
	/// Returned `state` is missing or does not match the pending authorization.
	#[error("An unknown error occurred, and we were unable to verify your request.")]
	InvalidState,
	/// Redirect did not carry an authorization code.
	#[error("GitLab did not return an authorization code.")]
	MissingCode,
}

/// User-facing reason a step halted the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum HaltError {
	/// Policy rejection.
	#[error(transparent)]
	Policy(#[from] PolicyError),
	/// Authorization redirect problem.
	#[error(transparent)]
	Callback(#[from] CallbackError),
}

/// Signals that a previously linked identity must be re-authenticated.
#[derive(Debug, ThisError)]
#[error("Identity is no longer valid: {reason}.")]
pub struct IdentityInvalid {
	/// Why the identity was invalidated.
	pub reason: String,
	/// Remote failure that triggered the invalidation, if any.
	#[source]
	pub source: Option<BoxError>,
}
impl IdentityInvalid {
	/// Creates an invalidation without an underlying cause.
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into(), source: None }
	}

	/// Creates an invalidation caused by another failure.
	pub fn caused_by(
		reason: impl Into<String>,
		source: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self { reason: reason.into(), source: Some(Box::new(source)) }
	}
}

/// Inconsistent pipeline state or cursor.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PipelineError {
	/// A step read a state key no earlier step wrote.
	#[error("Pipeline state is missing `{key}`.")]
	MissingState {
		/// State key that was read.
		key: &'static str,
	},
	/// Persisted session belongs to a different pipeline.
	#[error("Pipeline session belongs to the {found} pipeline, not {expected}.")]
	KindMismatch {
		/// Pipeline kind being advanced.
		expected: &'static str,
		/// Pipeline kind recorded in the session.
		found: &'static str,
	},
	/// Session already ran every step.
	#[error("Pipeline session has already completed.")]
	Completed,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Settings source could not be loaded or deserialized.
	#[error("Settings could not be loaded.")]
	Settings(#[from] config::ConfigError),
	/// A required setting is empty.
	#[error("Setting `{name}` must not be empty.")]
	EmptySetting {
		/// Setting name.
		name: &'static str,
	},
	/// Domain cannot be turned into a URL.
	#[error("Domain `{domain}` does not form a valid URL.")]
	InvalidDomain {
		/// Offending domain.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint uses a scheme other than HTTP(S).
	#[error("The {endpoint} endpoint must use HTTP(S): {url}.")]
	UnsupportedEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint URL rejected by the OAuth client.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Persisted provider configuration cannot be decoded.
	#[error("Provider configuration is malformed.")]
	InvalidProviderConfig(#[from] serde_json::Error),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Stored token data carries no refresh token.
	#[error("Stored token data is missing a refresh token.")]
	MissingRefreshToken,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary token endpoint failures.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures while calling the token endpoint.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
