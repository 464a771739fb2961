/// JWT Token Generation and Validation
///
/// HS256 access tokens keyed by the process-wide signing secret. Validation
/// is purely local: no storage lookup, so a token lives until `exp`.

use chrono::Duration;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ReceivedClaims};
use crate::configuration::SigningSecret;
use crate::error::AuthError;

/// Upper bound on access token lifetime, whatever the caller asks for
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Generate a new access token for a user
///
/// The lifetime is `min(ttl, 1 hour)`.
///
/// # Errors
/// Returns `SigningFailure` if encoding fails
pub fn generate_access_token(
    user_id: &Uuid,
    secret: &SigningSecret,
    ttl: Duration,
) -> Result<String, AuthError> {
    let ttl = ttl.min(Duration::seconds(MAX_ACCESS_TOKEN_TTL_SECONDS));
    let claims = Claims::new(*user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::SigningFailure(e.to_string()))
}

/// Validate an access token and return its subject
///
/// Checks run in order: structure, signature, expiry, issuer, subject. The
/// first failing check decides the error.
pub fn validate_access_token(token: &str, secret: &SigningSecret) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    // Issuer and subject are checked below, after expiry
    validation.set_required_spec_claims(&["exp"]);

    let claims = decode::<ReceivedClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| classify(&e))?;

    claims.subject()
}

fn classify(err: &JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::SignatureMismatch,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::ISSUER;
    use serde_json::json;

    fn test_secret() -> SigningSecret {
        SigningSecret::new("test-secret-key-at-least-32-characters-long")
    }

    fn sign<T: serde::Serialize>(claims: &T, secret: &SigningSecret) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_generate_and_validate_token() {
        let secret = test_secret();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, &secret, Duration::minutes(15))
            .expect("Failed to generate token");
        let subject = validate_access_token(&token, &secret).expect("Failed to validate token");

        assert_eq!(subject, user_id);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_lifetime_is_capped_at_one_hour() {
        let secret = test_secret();
        let token = generate_access_token(&Uuid::new_v4(), &secret, Duration::days(30))
            .expect("Failed to generate token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.exp - claims.iat, MAX_ACCESS_TOKEN_TTL_SECONDS);
        assert_eq!(claims.iss, "chirpy");
    }

    #[test]
    fn test_garbage_is_malformed() {
        let secret = test_secret();

        for token in ["", "not-a-jwt", "invalid.token.here"] {
            assert_eq!(
                validate_access_token(token, &secret),
                Err(AuthError::MalformedToken),
                "token: {:?}",
                token
            );
        }
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(&Uuid::new_v4(), &test_secret(), Duration::hours(1))
            .expect("Failed to generate token");

        let result = validate_access_token(&token, &SigningSecret::new("some-other-secret"));
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_tampered_claims() {
        let secret = test_secret();
        let token = generate_access_token(&Uuid::new_v4(), &secret, Duration::hours(1))
            .expect("Failed to generate token");

        // Splice in the claims of a token for someone else
        let other = generate_access_token(&Uuid::new_v4(), &secret, Duration::hours(1))
            .expect("Failed to generate token");
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(
            validate_access_token(&tampered, &secret),
            Err(AuthError::SignatureMismatch)
        );
    }

    #[test]
    fn test_expired_token() {
        let secret = test_secret();
        let token = generate_access_token(&Uuid::new_v4(), &secret, Duration::seconds(-10))
            .expect("Failed to generate token");

        assert_eq!(validate_access_token(&token, &secret), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_signature_is_checked_before_expiry() {
        let token = generate_access_token(&Uuid::new_v4(), &test_secret(), Duration::seconds(-10))
            .expect("Failed to generate token");

        let result = validate_access_token(&token, &SigningSecret::new("some-other-secret"));
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_wrong_issuer() {
        let secret = test_secret();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let result = validate_access_token(&sign(&claims, &secret), &secret);
        assert_eq!(result, Err(AuthError::InvalidIssuer));
    }

    #[test]
    fn test_expiry_is_checked_before_issuer() {
        let secret = test_secret();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::seconds(-10));
        claims.iss = "someone-else".to_string();

        let result = validate_access_token(&sign(&claims, &secret), &secret);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_subject_must_be_a_uuid() {
        let secret = test_secret();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.sub = "user-42".to_string();

        let result = validate_access_token(&sign(&claims, &secret), &secret);
        assert_eq!(result, Err(AuthError::MalformedSubject));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let secret = test_secret();
        let claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            validate_access_token(&token, &secret),
            Err(AuthError::SignatureMismatch)
        );
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn test_missing_issuer() {
        let secret = test_secret();
        let payload = json!({ "sub": Uuid::new_v4().to_string(), "exp": now() + 600 });

        let result = validate_access_token(&sign(&payload, &secret), &secret);
        assert_eq!(result, Err(AuthError::InvalidIssuer));
    }

    #[test]
    fn test_expiry_is_checked_before_missing_issuer() {
        let secret = test_secret();
        let payload = json!({ "sub": Uuid::new_v4().to_string(), "exp": now() - 600 });

        let result = validate_access_token(&sign(&payload, &secret), &secret);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_missing_subject() {
        let secret = test_secret();
        let payload = json!({ "iss": ISSUER, "exp": now() + 600 });

        let result = validate_access_token(&sign(&payload, &secret), &secret);
        assert_eq!(result, Err(AuthError::MalformedSubject));
    }

    #[test]
    fn test_numeric_subject() {
        let secret = test_secret();
        let payload = json!({ "iss": ISSUER, "sub": 42, "exp": now() + 600 });

        let result = validate_access_token(&sign(&payload, &secret), &secret);
        assert_eq!(result, Err(AuthError::MalformedSubject));
    }

    #[test]
    fn test_token_without_jti_or_iat_is_accepted() {
        let secret = test_secret();
        let user_id = Uuid::new_v4();
        let payload = json!({ "iss": ISSUER, "sub": user_id.to_string(), "exp": now() + 600 });

        assert_eq!(validate_access_token(&sign(&payload, &secret), &secret), Ok(user_id));
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let secret = test_secret();
        let payload = json!({ "iss": ISSUER, "sub": Uuid::new_v4().to_string() });

        let result = validate_access_token(&sign(&payload, &secret), &secret);
        assert_eq!(result, Err(AuthError::MalformedToken));
    }
}
