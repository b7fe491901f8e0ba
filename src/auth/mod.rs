use axum::http::{HeaderMap, Method};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims valid from now for `expiry_hours`. Lifetimes past chrono's range are refused.
    pub fn new(subject: impl Into<String>, expiry_hours: u64) -> Result<Self, AuthError> {
        let out_of_range = || AuthError::TokenGeneration(format!("expiry of {} hours is out of range", expiry_hours));

        let now = Utc::now();
        let lifetime = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(out_of_range)?;
        let exp = now.checked_add_signed(lifetime).ok_or_else(out_of_range)?;

        Ok(Self {
            sub: subject.into(),
            jti: Uuid::new_v4(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    InvalidScheme,

    #[error("Empty JWT token")]
    EmptyToken,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Identity attached to a request once the gate let it through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    User { subject: String, token_id: Uuid },
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User { .. })
    }

    pub fn subject(&self) -> &str {
        match self {
            Principal::Anonymous => "anonymous",
            Principal::User { subject, .. } => subject,
        }
    }
}

/// Which requests must carry a valid credential
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPolicy {
    /// Every request is treated as anonymous
    #[default]
    Disabled,
    /// Every request must authenticate
    Required,
    /// Safe methods may be anonymous, writes must authenticate
    ReadOnlyAnonymous,
}

impl AuthPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" | "off" => Some(AuthPolicy::Disabled),
            "required" => Some(AuthPolicy::Required),
            "read_only_anonymous" | "readonly" => Some(AuthPolicy::ReadOnlyAnonymous),
            _ => None,
        }
    }

    /// Whether a request with this method may proceed without credentials
    pub fn allows_anonymous(&self, method: &Method) -> bool {
        match self {
            AuthPolicy::Disabled => true,
            AuthPolicy::Required => false,
            AuthPolicy::ReadOnlyAnonymous => {
                matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
            }
        }
    }
}

/// Turns request credentials into a principal
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError>;
}

/// HS256 bearer-token authenticator
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator").finish_non_exhaustive()
    }
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        })
    }

    /// Validate JWT token and extract claims
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.decode(&token)?;

        Ok(Principal::User {
            subject: claims.sub,
            token_id: claims.jti,
        })
    }
}

/// Extract JWT token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidScheme)?;

    let token = auth_str.strip_prefix("Bearer ").ok_or(AuthError::InvalidScheme)?;
    if token.trim().is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token.trim().to_string())
}

pub fn generate_jwt(subject: &str, secret: &str, expiry_hours: u64) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let claims = Claims::new(subject, expiry_hours)?;
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}
