use crate::users::models::UserRole;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

pub const TOKEN_TYPE: &str = "Bearer";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    TokenFormat,
    #[error("invalid base64 encoding")]
    Base64,
    #[error("invalid JSON payload")]
    Json,
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("token kind mismatch")]
    WrongKind,
    #[error("token expired")]
    Expired,
}

/// Discriminates access tokens from refresh tokens so one can never be
/// presented where the other is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub kind: TokenKind,
    /// Random per-issuance id. Without it two tokens minted in the same
    /// second for the same user would be byte-identical, and so would the
    /// stored refresh token hashes.
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues and verifies compact HS256 tokens.
///
/// The clock is passed in by value; issuance draws a fresh `jti`,
/// verification is pure.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
    extended_refresh_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(
        secret: SecretString,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
        extended_refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            secret,
            access_ttl: Duration::seconds(access_ttl_seconds),
            refresh_ttl: Duration::seconds(refresh_ttl_seconds),
            extended_refresh_ttl: Duration::seconds(extended_refresh_ttl_seconds),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidSignature)
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header_b64 = Base64UrlUnpadded::encode_string(
            &serde_json::to_vec(&header).map_err(|_| TokenError::Json)?,
        );
        let claims_b64 = Base64UrlUnpadded::encode_string(
            &serde_json::to_vec(claims).map_err(|_| TokenError::Json)?,
        );
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Issue an access/refresh pair with `now` as the issuance instant.
    ///
    /// `extended` selects the long refresh lifetime ("remember me").
    ///
    /// # Errors
    ///
    /// Returns an error if claim serialization fails.
    pub fn issue_at(
        &self,
        sub: Uuid,
        email: &str,
        role: UserRole,
        extended: bool,
        now: DateTime<Utc>,
    ) -> Result<IssuedTokens, TokenError> {
        let refresh_ttl = if extended {
            self.extended_refresh_ttl
        } else {
            self.refresh_ttl
        };

        let access = Claims {
            sub,
            email: email.to_string(),
            role,
            kind: TokenKind::Access,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        let refresh = Claims {
            sub,
            email: email.to_string(),
            role,
            kind: TokenKind::Refresh,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + refresh_ttl).timestamp(),
        };

        Ok(IssuedTokens {
            access_token: self.encode(&access)?,
            refresh_token: self.encode(&refresh)?,
            token_type: TOKEN_TYPE,
            expires_in: access.exp - now.timestamp(),
            refresh_expires_at: now + refresh_ttl,
        })
    }

    /// Issue an access/refresh pair against the current clock.
    ///
    /// # Errors
    ///
    /// Returns an error if claim serialization fails.
    pub fn issue(
        &self,
        sub: Uuid,
        email: &str,
        role: UserRole,
        extended: bool,
    ) -> Result<IssuedTokens, TokenError> {
        self.issue_at(sub, email, role, extended, Utc::now())
    }

    /// Verify a token at instant `now` and return its claims.
    ///
    /// Verification order: format, algorithm, signature, kind, expiry. The
    /// signature is checked before any claim is trusted.
    ///
    /// # Errors
    ///
    /// Returns the decode failure, `Expired` kept distinct from
    /// `InvalidSignature` so callers can tell a stale token from a forged one.
    pub fn decode_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        let signature_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        if parts.next().is_some() {
            return Err(TokenError::TokenFormat);
        }

        let header_bytes =
            Base64UrlUnpadded::decode_vec(header_b64).map_err(|_| TokenError::Base64)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Json)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlg(header.alg));
        }

        let mut mac = self.mac()?;
        mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
        let signature =
            Base64UrlUnpadded::decode_vec(signature_b64).map_err(|_| TokenError::Base64)?;
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims_bytes =
            Base64UrlUnpadded::decode_vec(claims_b64).map_err(|_| TokenError::Base64)?;
        let claims: Claims =
            serde_json::from_slice(&claims_bytes).map_err(|_| TokenError::Json)?;

        if claims.kind != expected {
            return Err(TokenError::WrongKind);
        }

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Verify a token against the current clock.
    ///
    /// # Errors
    ///
    /// Returns the decode failure, see [`Self::decode_at`].
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        self.decode_at(token, expected, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            SecretString::from("test-signing-secret"),
            900,
            7 * 24 * 3600,
            30 * 24 * 3600,
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_decode_access() -> anyhow::Result<()> {
        let issuer = issuer();
        let now = fixed_now();
        let sub = Uuid::new_v4();

        let issued = issuer.issue_at(sub, "alice@example.com", UserRole::User, false, now)?;
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 900);

        let claims = issuer.decode_at(&issued.access_token, TokenKind::Access, now)?;
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.exp - claims.iat, 900);

        Ok(())
    }

    #[test]
    fn test_same_instant_issuance_yields_distinct_tokens() -> anyhow::Result<()> {
        // Two signins by the same user in the same second must not collide
        // on the stored refresh token hash.
        let issuer = issuer();
        let now = fixed_now();
        let sub = Uuid::new_v4();

        let first = issuer.issue_at(sub, "a@example.com", UserRole::User, false, now)?;
        let second = issuer.issue_at(sub, "a@example.com", UserRole::User, false, now)?;

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);

        let a = issuer.decode_at(&first.refresh_token, TokenKind::Refresh, now)?;
        let b = issuer.decode_at(&second.refresh_token, TokenKind::Refresh, now)?;
        assert_ne!(a.jti, b.jti);

        Ok(())
    }

    #[test]
    fn test_refresh_lifetime_standard_vs_extended() -> anyhow::Result<()> {
        let issuer = issuer();
        let now = fixed_now();
        let sub = Uuid::new_v4();

        let standard = issuer.issue_at(sub, "a@example.com", UserRole::User, false, now)?;
        let extended = issuer.issue_at(sub, "a@example.com", UserRole::User, true, now)?;

        assert_eq!(standard.refresh_expires_at, now + Duration::days(7));
        assert_eq!(extended.refresh_expires_at, now + Duration::days(30));

        Ok(())
    }

    #[test]
    fn test_decode_expired() -> anyhow::Result<()> {
        let issuer = issuer();
        let now = fixed_now();
        let issued = issuer.issue_at(Uuid::new_v4(), "a@example.com", UserRole::User, false, now)?;

        let later = now + Duration::seconds(901);
        let err = issuer
            .decode_at(&issued.access_token, TokenKind::Access, later)
            .unwrap_err();
        assert_eq!(err, TokenError::Expired);

        Ok(())
    }

    #[test]
    fn test_decode_wrong_kind() -> anyhow::Result<()> {
        let issuer = issuer();
        let now = fixed_now();
        let issued = issuer.issue_at(Uuid::new_v4(), "a@example.com", UserRole::User, false, now)?;

        let err = issuer
            .decode_at(&issued.refresh_token, TokenKind::Access, now)
            .unwrap_err();
        assert_eq!(err, TokenError::WrongKind);

        Ok(())
    }

    #[test]
    fn test_decode_tampered_signature() -> anyhow::Result<()> {
        let issuer = issuer();
        let now = fixed_now();
        let issued = issuer.issue_at(Uuid::new_v4(), "a@example.com", UserRole::User, false, now)?;

        let other = TokenIssuer::new(SecretString::from("other-secret"), 900, 604_800, 2_592_000);
        let err = other
            .decode_at(&issued.access_token, TokenKind::Access, now)
            .unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);

        Ok(())
    }

    #[test]
    fn test_decode_expired_token_keeps_valid_signature_distinct() -> anyhow::Result<()> {
        // An expired-but-genuine token must not be reported as forged.
        let issuer = issuer();
        let now = fixed_now();
        let issued = issuer.issue_at(Uuid::new_v4(), "a@example.com", UserRole::User, false, now)?;

        let mut tampered = issued.access_token.clone();
        tampered.pop();
        tampered.push('A');

        let later = now + Duration::days(1);
        assert_eq!(
            issuer.decode_at(&issued.access_token, TokenKind::Access, later),
            Err(TokenError::Expired)
        );
        assert_ne!(
            issuer.decode_at(&tampered, TokenKind::Access, later),
            Err(TokenError::Expired)
        );

        Ok(())
    }

    #[test]
    fn test_decode_malformed() {
        let issuer = issuer();
        let now = fixed_now();

        assert_eq!(
            issuer.decode_at("not-a-token", TokenKind::Access, now),
            Err(TokenError::TokenFormat)
        );
        assert_eq!(
            issuer.decode_at("a.b.c.d", TokenKind::Access, now),
            Err(TokenError::TokenFormat)
        );
        assert_eq!(
            issuer.decode_at("!!.??.##", TokenKind::Access, now),
            Err(TokenError::Base64)
        );
    }

    #[test]
    fn test_decode_unsupported_alg() {
        let issuer = issuer();
        let now = fixed_now();

        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = Base64UrlUnpadded::encode_string(b"{}");
        let token = format!("{header}.{claims}.AAAA");

        assert_eq!(
            issuer.decode_at(&token, TokenKind::Access, now),
            Err(TokenError::UnsupportedAlg("none".to_string()))
        );
    }
}
