//! Access tokens.
//!
//! Compact HS256 tokens in the usual three-segment form:
//! base64url(header) `.` base64url(claims) `.` base64url(signature), signed
//! with HMAC-SHA-256 over the first two segments. Verification checks the
//! signature in constant time before it trusts the claims, then the expiry.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use chrono::Utc;
use hearth_core::error::AuthError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// The claims carried in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user id this token was issued to
    pub sub: String,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
}

/// Issues and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    ttl_minutes: i64,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes: ttl_minutes.max(1),
        }
    }

    fn sign(&self, signing_input: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Issue a token for a user id, valid for the configured lifetime.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_minutes * 60,
        };
        let payload = serde_json::to_string(&claims)
            .map_err(|e| AuthError::TokenInvalid(format!("claims serialization: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            B64URL.encode(HEADER),
            B64URL.encode(payload)
        );
        let signature = self.sign(&signing_input);
        Ok(format!("{signing_input}.{}", B64URL.encode(signature)))
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::TokenInvalid("expected three segments".into()));
        }

        let signature = B64URL
            .decode(parts[2])
            .map_err(|e| AuthError::TokenInvalid(format!("signature encoding: {e}")))?;

        let signing_input = format!("{}.{}", parts[0], parts[1]);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::TokenInvalid("signature mismatch".into()))?;

        let payload = B64URL
            .decode(parts[1])
            .map_err(|e| AuthError::TokenInvalid(format!("claims encoding: {e}")))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| AuthError::TokenInvalid(format!("claims parse: {e}")))?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify() {
        let signer = TokenSigner::new("secret", 30);
        let token = signer.issue("user_42").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user_42");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenSigner::new("secret-a", 30).issue("user_42").unwrap();
        let err = TokenSigner::new("secret-b", 30).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn tampered_claims_rejected() {
        let signer = TokenSigner::new("secret", 30);
        let token = signer.issue("user_42").unwrap();

        // Swap in claims for a different user, keep the original signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = B64URL.encode(
            serde_json::to_string(&Claims {
                sub: "user_admin".into(),
                iat: 0,
                exp: i64::MAX,
            })
            .unwrap(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        let err = signer.verify(&forged).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn expired_token_rejected() {
        // ttl is clamped to at least one minute, so forge the timestamps
        let signer = TokenSigner::new("secret", 1);
        let now = Utc::now().timestamp();
        let payload = serde_json::to_string(&Claims {
            sub: "user_42".into(),
            iat: now - 120,
            exp: now - 60,
        })
        .unwrap();
        let signing_input = format!("{}.{}", B64URL.encode(HEADER), B64URL.encode(payload));
        let sig = {
            let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
            mac.update(signing_input.as_bytes());
            mac.finalize().into_bytes().to_vec()
        };
        let token = format!("{signing_input}.{}", B64URL.encode(sig));

        let err = signer.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn garbage_rejected() {
        let signer = TokenSigner::new("secret", 30);
        assert!(signer.verify("").is_err());
        assert!(signer.verify("a.b").is_err());
        assert!(signer.verify("not..a-token").is_err());
        assert!(signer.verify("a.b.c.d").is_err());
    }
}
