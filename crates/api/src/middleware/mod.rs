//! Request extractors that guard handlers.
//!
//! - [`auth::RequireSession`] -- Requires the session cookie on mutating routes.

pub mod auth;
