//! Business logic: account registration, login and token-backed identity lookup.

pub mod account;

pub use account::{AccountService, LoginOutcome};
