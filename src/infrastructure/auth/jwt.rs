//! JWT access and refresh token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Which of the two token kinds a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(user: &User, kind: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// User id from the subject claim
    pub fn user_id(&self) -> Result<UserId, DomainError> {
        self.sub
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| DomainError::unauthorized("Could not validate credentials"))
    }
}

/// Configuration for JWT service
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("access_token_minutes", &self.access_token_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(
        secret: impl Into<String>,
        access_token_minutes: i64,
        refresh_token_days: i64,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_token_minutes,
            refresh_token_days,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new("change-me-in-production", 30, 7)
    }
}

/// Trait for JWT operations
pub trait JwtGenerator: Send + Sync + Debug {
    /// Generate a token of the given kind for a user
    fn generate(&self, user: &User, kind: TokenKind) -> Result<String, DomainError>;

    /// Validate signature, expiry and token kind
    fn validate(&self, token: &str, kind: TokenKind) -> Result<JwtClaims, DomainError>;

    /// Access token lifetime in seconds
    fn access_token_ttl_secs(&self) -> i64;
}

/// HS256 JWT service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(JwtConfig::default())
    }

    fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(self.config.access_token_minutes),
            TokenKind::Refresh => Duration::days(self.config.refresh_token_days),
        }
    }
}

impl JwtGenerator for JwtService {
    fn generate(&self, user: &User, kind: TokenKind) -> Result<String, DomainError> {
        let claims = JwtClaims::new(user, kind, self.lifetime(kind));

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn validate(&self, token: &str, kind: TokenKind) -> Result<JwtClaims, DomainError> {
        let claims = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| DomainError::unauthorized(format!("Invalid JWT: {}", e)))?
            .claims;

        if claims.kind != kind {
            return Err(DomainError::unauthorized(format!(
                "Expected {} token, got {}",
                kind, claims.kind
            )));
        }

        Ok(claims)
    }

    fn access_token_ttl_secs(&self) -> i64 {
        self.config.access_token_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::NewUser;

    fn create_test_user() -> User {
        User::from_new(
            UserId::new(42),
            NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: "test@example.com".to_string(),
                password_hash: "hash".to_string(),
            },
        )
    }

    #[test]
    fn test_generate_and_validate_access() {
        let service = JwtService::new(JwtConfig::new("test-secret", 30, 7));
        let user = create_test_user();

        let token = service.generate(&user, TokenKind::Access).unwrap();
        let claims = service.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.user_id().unwrap(), UserId::new(42));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let service = JwtService::with_default_config();
        let user = create_test_user();

        let access = service.generate(&user, TokenKind::Access).unwrap();
        let refresh = service.generate(&user, TokenKind::Refresh).unwrap();

        assert!(service.validate(&access, TokenKind::Refresh).is_err());
        assert!(service.validate(&refresh, TokenKind::Access).is_err());
        assert!(service.validate(&refresh, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let user = create_test_user();
        let access = JwtClaims::new(&user, TokenKind::Access, Duration::minutes(30));
        let refresh = JwtClaims::new(&user, TokenKind::Refresh, Duration::days(7));

        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret1", 30, 7));
        let service2 = JwtService::new(JwtConfig::new("secret2", 30, 7));
        let token = service1
            .generate(&create_test_user(), TokenKind::Access)
            .unwrap();

        assert!(service2.validate(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(JwtConfig::new("test-secret", 30, 7));
        let past = Utc::now() - Duration::hours(1);
        let claims = JwtClaims {
            sub: "42".to_string(),
            email: "test@example.com".to_string(),
            kind: TokenKind::Access,
            iat: (past - Duration::hours(2)).timestamp(),
            exp: past.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.validate(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = JwtClaims {
            sub: "someone".to_string(),
            email: String::new(),
            kind: TokenKind::Access,
            iat: 0,
            exp: 0,
        };
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let service = JwtService::new(JwtConfig::new("very-secret", 30, 7));
        let output = format!("{:?}", service);
        assert!(!output.contains("very-secret"));
        assert_eq!(service.access_token_ttl_secs(), 1800);
    }
}
