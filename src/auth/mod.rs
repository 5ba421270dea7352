use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::AuthConfig;

/// Subject assigned to callers that present the pre-shared service key
pub const SERVICE_SUBJECT: &str = "service";

const BEARER_PREFIX: &str = "Bearer ";

/// Claims read from an inbound token.
///
/// `sub` is checked to be a non-empty string before these are built.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    exp: i64,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    aud: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

/// How a caller proved who they are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Token,
    ServiceKey,
}

/// Caller identity established for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub source: IdentitySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl VerifiedIdentity {
    pub fn service() -> Self {
        Self {
            subject: SERVICE_SUBJECT.to_string(),
            source: IdentitySource::ServiceKey,
            role: None,
            email: None,
        }
    }

    pub fn is_service(&self) -> bool {
        self.source == IdentitySource::ServiceKey
    }
}

impl From<Claims> for VerifiedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            source: IdentitySource::Token,
            role: claims.role,
            email: claims.email,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Authorization header is not valid text")]
    MalformedHeader,

    #[error("Authorization header must use Bearer token format")]
    MissingBearerPrefix,

    #[error("Bearer token is empty")]
    EmptyToken,

    #[error("token signed with an unexpected algorithm")]
    AlgorithmMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token is invalid: {0}")]
    InvalidToken(String),

    #[error("token does not carry a usable subject claim")]
    InvalidSubject,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Parameters for minting a token with [`IdentityVerifier::issue`]
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub subject: String,
    pub ttl: Duration,
    pub role: Option<String>,
    pub email: Option<String>,
}

impl TokenRequest {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ttl: Duration::hours(1),
            role: None,
            email: None,
        }
    }
}

/// Validates credentials against secrets fixed at construction.
///
/// Holds no mutable state and performs no I/O, so one instance is shared
/// across every request.
pub struct IdentityVerifier {
    config: AuthConfig,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(config: AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());

        // Only the configured algorithm is accepted; the header's `alg` must match it.
        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }

        Self {
            config,
            decoding_key,
            encoding_key,
            validation,
        }
    }

    /// Verify the raw `Authorization` header value of a request.
    ///
    /// The service key is accepted either as the whole header value or as
    /// the bearer token, and is never parsed as a JWT.
    pub fn verify(&self, authorization: Option<&str>) -> Result<VerifiedIdentity, AuthError> {
        let raw = authorization.ok_or(AuthError::MissingHeader)?;

        if self.is_service_key(raw) {
            return Ok(VerifiedIdentity::service());
        }

        let token = extract_bearer_token(raw)?;

        if self.is_service_key(token) {
            return Ok(VerifiedIdentity::service());
        }

        let claims = self.decode_claims(token)?;
        Ok(VerifiedIdentity::from(claims))
    }

    /// Decode and validate a bare token (no `Bearer ` prefix)
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        // Claims stay an untyped map until `sub` is known to be a non-empty string
        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::AlgorithmMismatch
                }
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::ImmatureSignature => AuthError::NotYetValid,
                ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => {
                    AuthError::InvalidSubject
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        match data.claims.get("sub") {
            Some(Value::String(sub)) if !sub.trim().is_empty() => {}
            _ => return Err(AuthError::InvalidSubject),
        }

        serde_json::from_value(Value::Object(data.claims))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Sign a token with the configured secret and algorithm
    pub fn issue(&self, request: &TokenRequest) -> Result<String, AuthError> {
        if request.subject.trim().is_empty() {
            return Err(AuthError::InvalidSubject);
        }

        let now = Utc::now();
        let expires = now
            .checked_add_signed(request.ttl)
            .ok_or_else(|| AuthError::Signing("token lifetime is out of range".to_string()))?;
        let claims = IssuedClaims {
            sub: &request.subject,
            exp: expires.timestamp(),
            iat: now.timestamp(),
            aud: self.config.audience.as_deref(),
            role: request.role.as_deref(),
            email: request.email.as_deref(),
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn is_service_key(&self, presented: &str) -> bool {
        match &self.config.service_key {
            Some(expected) => constant_time_eq(presented.as_bytes(), expected.as_bytes()),
            None => false,
        }
    }
}

/// Extract the token portion of a `Bearer <token>` header value
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    let token = auth_header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingBearerPrefix)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    Ok(token)
}

/// Compare two secrets without short-circuiting on the first differing byte.
///
/// Both sides are hashed first so the comparison length does not depend on
/// the presented value.
pub fn constant_time_eq(presented: &[u8], expected: &[u8]) -> bool {
    let a = Sha256::digest(presented);
    let b = Sha256::digest(expected);
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
