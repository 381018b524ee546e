/**
 * Bearer Tokens
 *
 * JWT creation and verification for the identity collaborator. Claims
 * carry the stable identity id plus the optional email/display-name
 * hints that username provisioning consumes.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token lifetime: 30 days.
const TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Stable identity id
    pub sub: String,
    /// Email hint for username provisioning
    #[serde(default)]
    pub email: Option<String>,
    /// Display-name hint for username provisioning
    #[serde(default)]
    pub name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// The verified caller: stable id plus provisioning hints.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl From<Claims> for CallerIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            display_name: claims.name,
        }
    }
}

/// Signs and verifies bearer tokens with a shared HS256 secret taken
/// from configuration at startup.
#[derive(Clone)]
pub struct TokenAuthority {
    secret: String,
}

impl TokenAuthority {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mint a token for an identity.
    pub fn create_token(
        &self,
        id: &str,
        email: Option<String>,
        name: Option<String>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let claims = Claims {
            sub: id.to_string(),
            email,
            name,
            exp: now + TOKEN_TTL_SECS,
            iat: now,
        };

        let key = EncodingKey::from_secret(self.secret.as_ref());
        encode(&Header::default(), &claims, &key)
    }

    /// Verify and decode a token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(self.secret.as_ref());
        let token_data = decode::<Claims>(token, &key, &Validation::default())?;
        Ok(token_data.claims)
    }
}
