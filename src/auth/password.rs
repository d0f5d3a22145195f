//! Password hashing and verification (Argon2id, PHC strings).
//!
//! Hashes are self-describing: `$argon2id$v=19$m=..,t=..,p=..$<salt>$<digest>`.
//! Verification reads algorithm, parameters and salt back out of the stored
//! string, so the work factor can be raised without touching existing rows.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher as _, PasswordVerifier, Salt, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Verified against when the account does not exist, so that path costs
    /// the same as a real mismatch.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(params: HashParams) -> AppResult<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("argon2 params: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hasher = Self {
            argon2,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash("account-auth-timing-equalizer")?;
        Ok(hasher)
    }

    /// Hash a plaintext password into a PHC string with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> AppResult<String> {
        let mut salt = [0u8; Salt::RECOMMENDED_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| AppError::Hash(format!("entropy source: {}", e)))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| AppError::Hash(format!("salt: {}", e)))?;

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// Malformed hashes and mismatches both yield `false`.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend one verification worth of work and fail.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.dummy_hash);
        false
    }
}
