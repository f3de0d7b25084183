use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, HttpRequest};

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Validate the static bearer token carried by an MCP request.
pub fn validate_request_token(req: &HttpRequest, expected: &str) -> Result<(), Error> {
    let token =
        extract_token(req).ok_or_else(|| ErrorUnauthorized("Missing authorization token"))?;

    if !tokens_match(token, expected) {
        log::warn!("Rejected MCP request with invalid bearer token");
        return Err(ErrorUnauthorized("Invalid token"));
    }

    Ok(())
}

/// Compare without short-circuiting on the first differing byte.
fn tokens_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_valid_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer s3cret"))
            .to_http_request();
        assert!(validate_request_token(&req, "s3cret").is_ok());
    }

    #[test]
    fn test_missing_header() {
        let req = TestRequest::default().to_http_request();
        assert!(validate_request_token(&req, "s3cret").is_err());
    }

    #[test]
    fn test_wrong_scheme_and_token() {
        let basic = TestRequest::default()
            .insert_header(("Authorization", "Basic s3cret"))
            .to_http_request();
        assert!(validate_request_token(&basic, "s3cret").is_err());

        let wrong = TestRequest::default()
            .insert_header(("Authorization", "Bearer s3cre7"))
            .to_http_request();
        assert!(validate_request_token(&wrong, "s3cret").is_err());
    }

    #[test]
    fn test_tokens_match_length_mismatch() {
        assert!(!tokens_match("abc", "abcd"));
        assert!(tokens_match("abcd", "abcd"));
    }
}
