//! GitLab single-sign-on for auth hosts: OAuth 2.0 login, group-gated access, and resumable
//! identity-linking pipelines.
//!
//! The crate plugs into a host authentication framework through three seams:
//!
//! - [`provider::AuthProvider`] hands the host an ordered [`pipeline::Pipeline`] for login (`auth`)
//!   and for admin configuration (`setup`), and turns the final [`pipeline::PipelineState`] into a
//!   persisted [`auth::LocalIdentity`] and [`provider::ProviderConfig`].
//! - [`store::IdentityStore`] lets steps look up identities the host already linked.
//! - [`view::View`] describes the forms a step wants rendered; markup stays with the host.
//!
//! Remote calls go through [`api::GitLabClient`], whose error surface ([`error::ApiError`])
//! carries the HTTP status (or `0` for transport failures).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod pipeline;
pub mod provider;
pub mod settings;
pub mod steps;
pub mod store;
pub mod view;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
