//! # Recipebox
//!
//! A session-authenticated REST backend for a recipe-sharing application.
//! Users sign up, log in and add to a shared list of recipes.
//!
//! ## Sessions
//!
//! Signup and login open a server-side session and hand the client an opaque
//! token in the `recipebox_session` cookie (or as a bearer token). Only the
//! SHA-256 hash of the token is stored. Sessions expire after a configurable
//! TTL and are destroyed on logout.
//!
//! ## Passwords
//!
//! Passwords are hashed with Argon2id on the blocking thread pool. Login
//! failures never reveal whether the username exists: an unknown username
//! is verified against a decoy hash so both paths cost the same.
//!
//! ## Storage
//!
//! [`store::CredentialStore`] and [`store::SessionStore`] abstract over
//! PostgreSQL ([`store::PgStore`]) and an in-memory store used by tests and
//! `--in-memory` runs.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod error;
pub mod recipes;
pub mod sessions;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
