/// Token Codec
///
/// Encodes claim sets into compact HS256-signed JWTs and decodes them back.
///
/// Decoding checks, in order:
/// 1. the signature, against the key for the expected purpose
/// 2. the payload shape and issuer
/// 3. the purpose tag
///
/// Expiry is not checked here; callers use `is_expired` with the codec's clock.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};

use crate::auth::claims::{Claims, TokenPurpose};
use crate::auth::clock::Clock;

const FINGERPRINT_LENGTH: usize = 12;

/// Secret key material bound to one token purpose
#[derive(Clone)]
pub struct SigningKey {
    purpose: TokenPurpose,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn new(purpose: TokenPurpose, secret: &str) -> Self {
        Self {
            purpose,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn purpose(&self) -> TokenPurpose {
        self.purpose
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("purpose", &self.purpose)
            .finish_non_exhaustive()
    }
}

/// Token encode/decode failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a parseable token, or the payload is not a valid claim set
    Malformed(String),
    /// Signature does not match the payload under the given key
    InvalidSignature,
    /// Token was minted for another purpose
    WrongPurpose {
        expected: TokenPurpose,
        found: TokenPurpose,
    },
    /// Signing failed
    Encoding(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed(msg) => write!(f, "Malformed token: {}", msg),
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::WrongPurpose { expected, found } => {
                write!(f, "Expected a {} token, got a {} token", expected, found)
            }
            TokenError::Encoding(msg) => write!(f, "Token generation failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Signs and verifies tokens for one issuer
#[derive(Clone)]
pub struct TokenCodec {
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(issuer: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer: issuer.into(),
            clock,
        }
    }

    /// Current time from the codec's clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Mint a token for `subject`, valid for `ttl_seconds` from now
    ///
    /// The purpose tag is taken from the key.
    pub fn encode(
        &self,
        subject: &str,
        key: &SigningKey,
        ttl_seconds: i64,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, key.purpose(), self.now(), ttl_seconds, &self.issuer);
        self.encode_claims(&claims, key)
    }

    /// Sign an already built claim set
    ///
    /// # Errors
    /// Returns `WrongPurpose` if the claims were built for another key.
    pub fn encode_claims(&self, claims: &Claims, key: &SigningKey) -> Result<String, TokenError> {
        if claims.purpose != key.purpose() {
            return Err(TokenError::WrongPurpose {
                expected: key.purpose(),
                found: claims.purpose,
            });
        }

        encode(&Header::new(Algorithm::HS256), claims, &key.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify and decode a token with the key for its expected purpose
    pub fn decode(&self, token: &str, key: &SigningKey) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &key.decoding, &self.validation())?.claims;

        if claims.purpose != key.purpose() {
            tracing::warn!(
                token = %token_fingerprint(token),
                expected = %key.purpose(),
                found = %claims.purpose,
                "Token presented for the wrong purpose"
            );
            return Err(TokenError::WrongPurpose {
                expected: key.purpose(),
                found: claims.purpose,
            });
        }

        Ok(claims)
    }

    /// Decode a token and return only its subject
    pub fn extract_subject(&self, token: &str, key: &SigningKey) -> Result<String, TokenError> {
        self.decode(token, key).map(|claims| claims.sub)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock, not here
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);
        validation.set_issuer(&[&self.issuer]);
        validation
    }
}

/// True iff `now` has reached the claim set's expiry
pub fn is_expired(claims: &Claims, now: i64) -> bool {
    claims.is_expired(now)
}

/// Short, non-reversible token identifier safe to put in logs
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(FINGERPRINT_LENGTH);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;

    const START: i64 = 1_700_000_000;

    fn codec() -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        (TokenCodec::new("test", clock.clone()), clock)
    }

    fn access_key() -> SigningKey {
        SigningKey::new(TokenPurpose::Access, "access-secret-key-at-least-32-characters")
    }

    fn refresh_key() -> SigningKey {
        SigningKey::new(TokenPurpose::Refresh, "refresh-secret-key-at-least-32-characters")
    }

    #[test]
    fn test_encode_and_decode_round_trip() {
        let (codec, _) = codec();
        let claims = Claims::new("alice@example.com", TokenPurpose::Access, START, 900, "test");

        let token = codec.encode_claims(&claims, &access_key()).expect("Failed to encode");
        let decoded = codec.decode(&token, &access_key()).expect("Failed to decode");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_encode_stamps_time_from_clock() {
        let (codec, clock) = codec();
        clock.advance(42);

        let token = codec.encode("alice@example.com", &refresh_key(), 3600).unwrap();
        let claims = codec.decode(&token, &refresh_key()).unwrap();

        assert_eq!(claims.iat, START + 42);
        assert_eq!(claims.exp, START + 42 + 3600);
        assert_eq!(claims.purpose, TokenPurpose::Refresh);
        assert_eq!(claims.iss, "test");
    }

    #[test]
    fn test_encoding_is_deterministic_for_fixed_claims() {
        let (codec, _) = codec();
        let claims = Claims::new("alice@example.com", TokenPurpose::Access, START, 900, "test");

        let a = codec.encode_claims(&claims, &access_key()).unwrap();
        let b = codec.encode_claims(&claims, &access_key()).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_subject() {
        let (codec, _) = codec();
        let token = codec.encode("alice@example.com", &access_key(), 900).unwrap();

        assert_eq!(
            codec.extract_subject(&token, &access_key()).unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (codec, _) = codec();

        assert!(matches!(
            codec.decode("invalid.token.here", &access_key()),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            codec.decode("", &access_key()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_any_altered_character_is_rejected() {
        let (codec, _) = codec();
        let token = codec.encode("alice@example.com", &access_key(), 900).unwrap();

        for i in 0..token.len() {
            if token.as_bytes()[i] == b'.' {
                continue;
            }
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            match codec.decode(&tampered, &access_key()) {
                Err(TokenError::InvalidSignature) | Err(TokenError::Malformed(_)) => {}
                other => panic!("Tampered byte {} was not rejected: {:?}", i, other),
            }
        }
    }

    #[test]
    fn test_appended_garbage_is_rejected() {
        let (codec, _) = codec();
        let token = codec.encode("alice@example.com", &access_key(), 900).unwrap();

        assert!(codec.decode(&format!("{}X", token), &access_key()).is_err());
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let (codec, _) = codec();
        let token = codec.encode("alice@example.com", &access_key(), 900).unwrap();
        let other = SigningKey::new(TokenPurpose::Access, "another-secret-key-at-least-32-chars");

        assert_eq!(codec.decode(&token, &other), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_access_token_rejected_by_refresh_key() {
        let (codec, _) = codec();
        let token = codec.encode("alice@example.com", &access_key(), 900).unwrap();

        assert_eq!(codec.decode(&token, &refresh_key()), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_refresh_token_rejected_by_access_key() {
        let (codec, _) = codec();
        let token = codec.encode("alice@example.com", &refresh_key(), 3600).unwrap();

        assert_eq!(codec.decode(&token, &access_key()), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_purpose_tag_enforced_even_with_shared_secret() {
        let (codec, _) = codec();
        let secret = "shared-secret-key-at-least-32-characters";
        let access = SigningKey::new(TokenPurpose::Access, secret);
        let refresh = SigningKey::new(TokenPurpose::Refresh, secret);

        let token = codec.encode("alice@example.com", &access, 900).unwrap();

        assert_eq!(
            codec.decode(&token, &refresh),
            Err(TokenError::WrongPurpose {
                expected: TokenPurpose::Refresh,
                found: TokenPurpose::Access,
            })
        );
    }

    #[test]
    fn test_encode_claims_refuses_mismatched_key() {
        let (codec, _) = codec();
        let claims = Claims::new("alice@example.com", TokenPurpose::Refresh, START, 900, "test");

        assert!(matches!(
            codec.encode_claims(&claims, &access_key()),
            Err(TokenError::WrongPurpose { .. })
        ));
    }

    #[test]
    fn test_foreign_issuer_is_malformed() {
        let (codec, clock) = codec();
        let foreign = TokenCodec::new("someone-else", clock);
        let token = foreign.encode("alice@example.com", &access_key(), 900).unwrap();

        assert!(matches!(
            codec.decode(&token, &access_key()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_does_not_check_expiry() {
        let (codec, clock) = codec();
        let token = codec.encode("alice@example.com", &access_key(), 60).unwrap();
        clock.advance(10_000);

        let claims = codec.decode(&token, &access_key()).unwrap();
        assert!(is_expired(&claims, codec.now()));
    }

    #[test]
    fn test_expiry_monotonicity() {
        let (codec, _) = codec();
        let ttl = 900;
        let token = codec.encode("alice@example.com", &access_key(), ttl).unwrap();
        let claims = codec.decode(&token, &access_key()).unwrap();

        assert!(!is_expired(&claims, claims.iat));
        assert!(is_expired(&claims, claims.iat + ttl + 1));
    }

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let a = token_fingerprint("some.token.value");
        let b = token_fingerprint("some.token.value");

        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LENGTH);
        assert_ne!(a, token_fingerprint("other.token.value"));
    }
}
