//! OAuth token material kept in pipeline state and identity data.

pub mod payload;
pub mod secret;
