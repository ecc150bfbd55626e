//! Concrete pipeline steps: the OAuth 2.0 login/callback pair and the GitLab policy steps.

pub mod authorize;
pub mod confirm_email;
pub mod fetch_user;
pub mod select_group;

pub use authorize::{OAuth2Callback, OAuth2Login};
pub use confirm_email::ConfirmEmail;
pub use fetch_user::FetchUser;
pub use select_group::SelectGroup;
