//! Token validation for the bearer scheme used by the bot platform: the
//! token payload is a Base64-encoded phone number, e.g.
//! "OTk4NzY1NDMyMTA=" for "99876543210". A production deployment would
//! swap this for a real JWT/OAuth validator.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum AuthError {
    #[error("Missing Bearer token")]
    MissingBearer,

    #[error("Invalid token: cannot decode")]
    CannotDecode,

    #[error("Invalid token: phone format")]
    InvalidPhoneFormat,
}

/// Decodes the token and returns the phone number it carries.
pub fn extract_phone_from_token(token: &str) -> Result<String, AuthError> {
    let decoded = STANDARD
        .decode(token)
        .map_err(|_| AuthError::CannotDecode)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::CannotDecode)?;
    let phone = decoded.trim();

    let digits_only = phone.chars().all(|c| c.is_ascii_digit());
    if !digits_only || !(10..=15).contains(&phone.len()) {
        return Err(AuthError::InvalidPhoneFormat);
    }
    Ok(phone.to_string())
}

/// Pulls the phone out of an `Authorization: Bearer <token>` header value.
/// The scheme is case-insensitive per RFC 7235.
pub fn phone_from_authorization_header(header_value: &str) -> Result<String, AuthError> {
    let (scheme, token) = header_value
        .split_once(' ')
        .ok_or(AuthError::MissingBearer)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingBearer);
    }
    extract_phone_from_token(token.trim())
}

#[cfg(test)]
mod auth_tests {
    use super::{extract_phone_from_token, phone_from_authorization_header, AuthError};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn valid_token_yields_phone() {
        let token = STANDARD.encode("919876543210");
        assert_eq!(
            extract_phone_from_token(&token),
            Ok("919876543210".to_string())
        );
    }

    #[test]
    fn garbage_token_cannot_decode() {
        assert_eq!(
            extract_phone_from_token("not-base64!!"),
            Err(AuthError::CannotDecode)
        );
    }

    #[test]
    fn short_or_non_numeric_phone_is_rejected() {
        let short = STANDARD.encode("12345");
        assert_eq!(
            extract_phone_from_token(&short),
            Err(AuthError::InvalidPhoneFormat)
        );

        let letters = STANDARD.encode("not-a-phone-no");
        assert_eq!(
            extract_phone_from_token(&letters),
            Err(AuthError::InvalidPhoneFormat)
        );
    }

    #[test]
    fn header_must_use_bearer_scheme() {
        let token = STANDARD.encode("919876543210");
        assert_eq!(
            phone_from_authorization_header(&format!("Bearer {}", token)),
            Ok("919876543210".to_string())
        );
        assert_eq!(
            phone_from_authorization_header(&format!("Basic {}", token)),
            Err(AuthError::MissingBearer)
        );
        assert_eq!(
            phone_from_authorization_header(token.as_str()),
            Err(AuthError::MissingBearer)
        );
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let token = STANDARD.encode("919876543210");
        for scheme in ["bearer", "BEARER", "BeArEr"] {
            assert_eq!(
                phone_from_authorization_header(&format!("{} {}", scheme, token)),
                Ok("919876543210".to_string())
            );
        }
    }
}
