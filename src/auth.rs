//! Auth-domain identifiers, token data, and linked identities.

pub mod id;
pub mod identity;
pub mod token;

pub use id::*;
pub use identity::*;
pub use token::{payload::*, secret::*};
