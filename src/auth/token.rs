//! JWT issue and validation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::AuthenticatedIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account
    pub uid: String, // user id
    pub iat: i64,
    pub exp: i64,
}

impl TryFrom<Claims> for AuthenticatedIdentity {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.uid)
            .map_err(|e| AppError::TokenInvalid(format!("uid: {}", e)))?;
        Ok(AuthenticatedIdentity {
            user_id,
            account: claims.sub,
        })
    }
}

/// A freshly signed token and the window it is valid for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with the process-wide HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, identity: &AuthenticatedIdentity, ttl: Duration) -> AppResult<IssuedToken> {
        self.issue_at(identity, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        identity: &AuthenticatedIdentity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedToken> {
        let iat = now.timestamp();
        let exp = iat + ttl.num_seconds();
        let claims = Claims {
            sub: identity.account.clone(),
            uid: identity.user_id.to_string(),
            iat,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::TokenIssuance(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: timestamp(iat)?,
            expires_at: timestamp(exp)?,
        })
    }

    /// Check signature and expiry, returning the raw claims.
    ///
    /// A token is valid only while `now < exp`.
    pub fn verify_claims(&self, token: &str) -> AppResult<Claims> {
        self.verify_claims_at(token, Utc::now())
    }

    fn verify_claims_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid(e.to_string()),
            }
        })?;
        // jsonwebtoken still accepts `exp == now`.
        if data.claims.exp <= now.timestamp() {
            return Err(AppError::TokenExpired);
        }
        Ok(data.claims)
    }

    pub fn verify(&self, token: &str) -> AppResult<AuthenticatedIdentity> {
        self.verify_claims(token)?.try_into()
    }
}

fn timestamp(secs: i64) -> AppResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AppError::TokenIssuance(format!("timestamp out of range: {}", secs)))
}
