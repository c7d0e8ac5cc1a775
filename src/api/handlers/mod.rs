//! API handlers for recipebox.
//!
//! Handlers resolve the request's [`SessionContext`](crate::sessions::SessionContext)
//! from its headers, call into the services held by
//! [`AppState`](crate::api::state::AppState) and turn every failure into an
//! [`ApiError`] with a JSON `{"error": ...}` body.

pub mod auth;
pub mod error;
pub mod health;
pub mod recipes;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApiError, ErrorBody};
