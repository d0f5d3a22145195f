//! Data models for accounts, credentials and authenticated identities.

pub mod account;

pub use account::*;
