//! Bearer token codec: Claim → signed token string → Claim.
//!
//! Wire format is base64(HS256 JWT). The outer base64 layer looks redundant
//! but existing clients send exactly this shape, so it stays.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::services::auth::claims::Claim;

/// Codec failures.
///
/// `Invalid` deliberately covers malformed base64, malformed JWT, bad
/// signature and expiry alike: callers (and clients) see one uniform
/// authentication failure. Known usability gap, kept for contract fidelity.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired auth token")]
    Invalid,
    #[error("failed to sign auth token")]
    Sign,
}

/// Stateless sign/verify over a shared symmetric secret.
///
/// Pure computation, no I/O; safe to use concurrently from every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
    leeway_seconds: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: u64, leeway_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
            leeway_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a claim into a transportable bearer token.
    ///
    /// A non-zero configured TTL stamps `exp = now + ttl`; TTL 0 clears `exp`
    /// entirely ("no expiration" escape hatch). The claim passed in is
    /// mutated: treat it as consumed if you rely on its `exp` afterwards.
    pub fn sign(&self, claim: &mut Claim) -> Result<String, TokenError> {
        if self.ttl_seconds > 0 {
            claim.exp = Some(Utc::now().timestamp() + self.ttl_seconds as i64);
        } else {
            claim.exp = None;
        }

        let jwt = jsonwebtoken::encode(&Header::new(Algorithm::HS256), claim, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign claim");
                TokenError::Sign
            })?;

        Ok(BASE64.encode(jwt))
    }

    /// Verify a bearer token and reconstruct its claim.
    ///
    /// Any failure at any stage returns `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claim, TokenError> {
        let jwt_bytes = BASE64.decode(token).map_err(|_| TokenError::Invalid)?;
        let jwt = std::str::from_utf8(&jwt_bytes).map_err(|_| TokenError::Invalid)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_seconds;
        validation.validate_nbf = true;
        // exp/nbf are validated when present, but a token signed with TTL 0
        // carries no exp at all and must still verify.
        validation.set_required_spec_claims::<&str>(&[]);

        let data = jsonwebtoken::decode::<Claim>(jwt, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::claims::{ClaimType, Role};

    fn codec(ttl: u64) -> TokenCodec {
        TokenCodec::new("test-secret", ttl, 0)
    }

    fn customer_claim() -> Claim {
        Claim {
            id: "u-1".into(),
            customer_id: Some("c-1".into()),
            cart_id: None,
            keeper_user_id: None,
            claim_type: ClaimType::Customer,
            role: Role::User,
            full_name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone_no: "+910000000000".into(),
            gender: "female".into(),
            dob: "1990-04-02".into(),
            profile_image: "https://cdn.example.com/a.png".into(),
            email_verified: true,
            phone_verified: false,
            exp: None,
            iat: None,
            nbf: None,
        }
    }

    #[test]
    fn round_trip_with_zero_ttl() {
        let codec = codec(0);
        let mut claim = customer_claim();
        let token = codec.sign(&mut claim).unwrap();

        let decoded = codec.verify(&token).unwrap();
        assert_eq!(decoded, claim);
        assert_eq!(decoded.exp, None);
    }

    #[test]
    fn positive_ttl_stamps_expiry_on_the_input_claim() {
        let codec = codec(3600);
        let mut claim = customer_claim();
        let before = Utc::now().timestamp();
        let token = codec.sign(&mut claim).unwrap();

        let exp = claim.exp.expect("sign must stamp exp");
        assert!(exp >= before + 3600);

        let decoded = codec.verify(&token).unwrap();
        assert_eq!(decoded.exp, claim.exp);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec(0);
        let mut claim = customer_claim();
        claim.exp = Some(Utc::now().timestamp() - 120);

        // Encode directly so sign() cannot overwrite the past exp.
        let jwt = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claim,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let token = BASE64.encode(jwt);

        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn token_not_yet_valid_is_rejected() {
        let codec = codec(0);
        let mut claim = customer_claim();
        claim.nbf = Some(Utc::now().timestamp() + 3600);

        let jwt = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claim,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let token = BASE64.encode(jwt);

        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec(0);
        let mut claim = customer_claim();
        let token = codec.sign(&mut claim).unwrap();

        // Flip one character somewhere in the middle of the outer encoding.
        let mut bytes = token.into_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let mut claim = customer_claim();
        let token = codec(0).sign(&mut claim).unwrap();

        let other = TokenCodec::new("other-secret", 0, 0);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn garbage_is_rejected_not_panicked() {
        let codec = codec(0);
        assert!(codec.verify("not base64 at all!!").is_err());
        assert!(codec.verify(&BASE64.encode("not a jwt")).is_err());
        assert!(codec.verify("").is_err());
    }
}
