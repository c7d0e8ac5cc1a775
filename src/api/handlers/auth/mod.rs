//! Auth handlers: signup, login, logout and session checks.
//!
//! Sessions travel in the `recipebox_session` cookie; API clients may send
//! the same token as `Authorization: Bearer <token>` instead.

pub mod login;
pub mod session;
pub mod signup;
pub mod types;
