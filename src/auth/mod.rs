pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub use extractors::{CurrentUser, MaybeUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, JwtKeys, TokenError};

lazy_static! {
    pub static ref EMAIL_REGEX: Regex =
        Regex::new(r"^([A-Za-z0-9]+[._-])*[A-Za-z0-9]+@[A-Za-z0-9-]+(\.[A-Za-z]{2,})+$").unwrap();
}

fn validate_grant_type(grant_type: &str) -> Result<(), ValidationError> {
    if grant_type == "password" {
        Ok(())
    } else {
        Err(ValidationError::new("grant_type must be \"password\""))
    }
}

/// OAuth2 password-flow form posted to `/auth/token`, keyed by email instead of username.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(custom = "validate_grant_type")]
    pub grant_type: Option<String>,
    #[validate(regex(path = "EMAIL_REGEX", message = "Invalid email"))]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub scope: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl TokenRequest {
    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split_whitespace().collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl AccessTokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Body of the resend-verification and forgot-password requests.
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(
        length(max = 35),
        regex(path = "EMAIL_REGEX", message = "Invalid email")
    )]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 8, max = 64))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_request(email: &str, grant_type: Option<&str>) -> TokenRequest {
        TokenRequest {
            grant_type: grant_type.map(String::from),
            email: email.to_string(),
            password: "password123".to_string(),
            scope: "tasks:read tasks:write".to_string(),
            client_id: None,
            client_secret: None,
        }
    }

    #[test]
    fn test_email_regex() {
        for email in ["steve@apple.com", "first.last@mail.co.uk", "a-b_c@x-y.io"] {
            assert!(EMAIL_REGEX.is_match(email), "{} should match", email);
        }
        for email in ["steve", "steve@", "@apple.com", "steve@apple", "st eve@apple.com"] {
            assert!(!EMAIL_REGEX.is_match(email), "{} should not match", email);
        }
    }

    #[test]
    fn test_token_request_validation() {
        assert!(token_request("steve@apple.com", None).validate().is_ok());
        assert!(token_request("steve@apple.com", Some("password"))
            .validate()
            .is_ok());
        assert!(token_request("steve@apple.com", Some("client_credentials"))
            .validate()
            .is_err());
        assert!(token_request("not-an-email", None).validate().is_err());
        assert_eq!(
            token_request("steve@apple.com", None).scopes(),
            vec!["tasks:read", "tasks:write"]
        );
    }

    #[test]
    fn test_email_request_length() {
        let ok = EmailRequest {
            email: "steve@apple.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let too_long = EmailRequest {
            email: format!("{}@apple.com", "s".repeat(30)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_new_password_request() {
        let short = NewPasswordRequest {
            password: "1234567".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = NewPasswordRequest {
            password: "12345678".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
