use crate::models::UserId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
#[cfg(test)]
use chrono::{Duration, Utc};
#[cfg(test)]
use jsonwebtoken::{encode, EncodingKey, Header};
#[cfg(test)]
use uuid::Uuid;

pub const REFRESH_TOKEN_TYPE: &str = "refresh";

// JWT Claims carried by a refresh token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub typ: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

/// HS256 codec for refresh tokens.
///
/// Tokens are minted by the login flow, so this service only decodes them.
/// Test builds can also mint tokens with the same secret.
#[derive(Clone)]
pub struct RefreshTokenCodec {
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    #[cfg(test)]
    encoding_key: EncodingKey,
    #[cfg(test)]
    ttl: Duration,
}

impl RefreshTokenCodec {
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            #[cfg(test)]
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            #[cfg(test)]
            ttl: Duration::days(30),
        }
    }

    #[cfg(test)]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[cfg(test)]
    pub fn encode(&self, user_id: UserId) -> Result<String, String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            typ: REFRESH_TOKEN_TYPE.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp().max(0) as usize,
            jti: Uuid::new_v4().to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| format!("Failed to generate refresh token: {}", e))
    }

    /// Verify signature, expiry, issuer and audience, then extract the user id.
    pub fn decode(&self, token: &str) -> Result<UserId, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid token: {}", e))?;

        if claims.typ != REFRESH_TOKEN_TYPE {
            return Err(format!("Invalid token: expected refresh token, got '{}'", claims.typ));
        }

        claims.sub.parse::<UserId>()
    }
}
