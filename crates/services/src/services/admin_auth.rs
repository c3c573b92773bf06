//! Admin sign-in: password check and signed, expiring session tokens.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{Rng, distributions::Alphanumeric};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use ts_rs::TS;

const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("admin login is disabled")]
    Disabled,
    #[error("invalid password")]
    InvalidPassword,
    #[error("invalid or expired session")]
    InvalidToken,
    #[error("failed to sign session: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AdminSessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct AdminLoginRequest {
    pub password: String,
}

pub struct AdminAuthService {
    password: Option<SecretString>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl AdminAuthService {
    /// Without a `session_secret` a random one is generated, so sessions end
    /// with the process.
    pub fn new(
        password: Option<&SecretString>,
        session_secret: Option<&SecretString>,
        ttl: Duration,
    ) -> Self {
        let secret = match session_secret {
            Some(secret) => secret.expose_secret().as_bytes().to_vec(),
            None => rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(64)
                .collect(),
        };
        Self {
            password: password.map(|p| SecretString::from(p.expose_secret())),
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn login(&self, attempt: &str) -> Result<AdminSessionToken, AdminAuthError> {
        let password = self.password.as_ref().ok_or(AdminAuthError::Disabled)?;
        let matches: bool = password
            .expose_secret()
            .as_bytes()
            .ct_eq(attempt.as_bytes())
            .into();
        if !matches {
            return Err(AdminAuthError::InvalidPassword);
        }
        self.issue(Utc::now())
    }

    fn issue(&self, now: DateTime<Utc>) -> Result<AdminSessionToken, AdminAuthError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| AdminAuthError::Signing(e.to_string()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AdminAuthError::Signing("session lifetime is out of range".to_string()))?;
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AdminAuthError::Signing(e.to_string()))?;
        Ok(AdminSessionToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims, AdminAuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<AdminClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AdminAuthError::InvalidToken)?;
        if data.claims.sub != ADMIN_SUBJECT {
            return Err(AdminAuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}
