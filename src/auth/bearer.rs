/// Authorization header parsing

use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Pull the token out of a `Bearer <token>` header value.
///
/// Extra whitespace around and between the two parts is ignored; anything
/// other than exactly those two parts is rejected.
pub fn extract_bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// Raw `Authorization` header of a request; empty when absent or not ASCII.
pub fn authorization_header(req: &HttpRequest) -> &str {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_valid_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        assert_eq!(extract_bearer_token("Bearer    tok   "), Ok("tok"));
        assert_eq!(extract_bearer_token("  Bearer\ttok"), Ok("tok"));
    }

    #[test]
    fn test_rejected_headers() {
        let rejected = vec![
            ("", "missing header"),
            ("   ", "blank header"),
            ("Basic tok", "wrong scheme"),
            ("bearer tok", "scheme is case sensitive"),
            ("Bearer ", "no token"),
            ("Bearer", "scheme only"),
            ("Bearer a b", "token with spaces"),
        ];

        for (header, reason) in rejected {
            assert_eq!(
                extract_bearer_token(header),
                Err(AuthError::MalformedAuthHeader),
                "Should reject header: {}",
                reason
            );
        }
    }

    #[test]
    fn test_authorization_header_from_request() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer xyz"))
            .to_http_request();
        assert_eq!(authorization_header(&req), "Bearer xyz");

        let req = TestRequest::default().to_http_request();
        assert_eq!(authorization_header(&req), "");
    }
}
