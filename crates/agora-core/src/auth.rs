use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use agora_types::UserId;
use agora_types::api::Claims;

use crate::error::{MessagingError, Result};

/// Turns a session token into the id of the user it was issued to.
pub trait AuthContext: Send + Sync {
    fn validate(&self, token: &str) -> Result<UserId>;
}

/// HS256 session tokens carrying [`Claims`].
pub struct JwtAuth {
    secret: String,
    ttl: chrono::Duration,
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: chrono::Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, user_id: UserId, handle: &str) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            handle: handle.to_string(),
            exp: (chrono::Utc::now() + self.ttl).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }
}

impl AuthContext for JwtAuth {
    fn validate(&self, token: &str) -> Result<UserId> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| MessagingError::unauthorized("invalid token"))?;

        Ok(data.claims.sub)
    }
}
