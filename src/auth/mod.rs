//! Authentication: password hashing, JWT session tokens, register/login handlers.

mod handlers;
mod password;
mod token;

pub use handlers::{login, me, register};
pub use password::{HashParams, PasswordHasher};
pub use token::{Claims, IssuedToken, TokenIssuer};
