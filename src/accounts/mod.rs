//! Accounts: password hashing and the signup/login/logout/session flow.

pub mod password;
pub mod service;

pub use password::PasswordHashing;
pub use service::{AuthService, Authenticated, SignupInput};
