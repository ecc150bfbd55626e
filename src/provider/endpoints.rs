//! OAuth and REST endpoints of a GitLab instance.

// self
use crate::{_prelude::*, error::ConfigError, settings::Settings};

/// Endpoint set of one GitLab instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the login step redirects to.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token: Url,
	/// Versioned REST API root, always ending in `/`.
	pub api: Url,
}
impl ProviderEndpoints {
	/// Validates explicit endpoints.
	///
	/// Every endpoint must use HTTP(S); the API root is normalized to end in `/`.
	pub fn new(authorization: Url, token: Url, mut api: Url) -> Result<Self, ConfigError> {
		validate_endpoint("authorization", &authorization)?;
		validate_endpoint("token", &token)?;
		validate_endpoint("api", &api)?;

		if !api.path().ends_with('/') {
			let path = format!("{}/", api.path());

			api.set_path(&path);
		}

		Ok(Self { authorization, token, api })
	}

	/// Derives `https://{base}/oauth/authorize`, `https://{base}/oauth/token`, and
	/// `https://{api}/api/v4/` from the settings.
	pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
		let base = https_root(&settings.base_domain)?;
		let api = https_root(settings.api_domain())?;
		let join = |root: &Url, path: &str, domain: &str| {
			root.join(path).map_err(|source| ConfigError::InvalidDomain {
				domain: domain.to_owned(),
				source,
			})
		};

		Self::new(
			join(&base, "oauth/authorize", &settings.base_domain)?,
			join(&base, "oauth/token", &settings.base_domain)?,
			join(&api, "api/v4/", settings.api_domain())?,
		)
	}
}

fn https_root(domain: &str) -> Result<Url, ConfigError> {
	let domain = domain.trim().trim_end_matches('/');

	Url::parse(&format!("https://{domain}/"))
		.map_err(|source| ConfigError::InvalidDomain { domain: domain.to_owned(), source })
}

fn validate_endpoint(endpoint: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "https" | "http") && url.has_host() {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedEndpoint { endpoint, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn derives_endpoints_from_domains() {
		let settings = Settings::builder("app", "secret", "gitlab.example.com")
			.api_domain("api.gitlab.example.com")
			.build()
			.expect("Settings should build.");
		let endpoints = ProviderEndpoints::from_settings(&settings).expect("Endpoints should derive.");

		assert_eq!(endpoints.authorization.as_str(), "https://gitlab.example.com/oauth/authorize");
		assert_eq!(endpoints.token.as_str(), "https://gitlab.example.com/oauth/token");
		assert_eq!(endpoints.api.as_str(), "https://api.gitlab.example.com/api/v4/");
	}

	#[test]
	fn rejects_non_http_endpoints_and_normalizes_api_root() {
		let parse = |value: &str| Url::parse(value).expect("URL fixture should parse.");
		let err = ProviderEndpoints::new(
			parse("ftp://gitlab.example.com/oauth/authorize"),
			parse("https://gitlab.example.com/oauth/token"),
			parse("https://gitlab.example.com/api/v4"),
		)
		.expect_err("FTP endpoint should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedEndpoint { endpoint: "authorization", .. }));

		let endpoints = ProviderEndpoints::new(
			parse("http://127.0.0.1:8080/oauth/authorize"),
			parse("http://127.0.0.1:8080/oauth/token"),
			parse("http://127.0.0.1:8080/api/v4"),
		)
		.expect("Loopback endpoints should validate.");

		assert_eq!(endpoints.api.as_str(), "http://127.0.0.1:8080/api/v4/");
	}

	#[test]
	fn rejects_malformed_domains() {
		let settings =
			Settings::builder("app", "secret", "bad domain").build().expect("Settings should build.");

		assert!(matches!(
			ProviderEndpoints::from_settings(&settings),
			Err(ConfigError::InvalidDomain { .. })
		));
	}
}
