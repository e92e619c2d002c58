use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::env;

use crate::{Error, Result};

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub website_url: String,
    pub jwt_algorithm: Algorithm,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").map_err(|_| Error::ConfigMissing {
                name: "JWT_SECRET".to_string(),
            })?,
            website_url: env::var("WEBSITE_URL").map_err(|_| Error::ConfigMissing {
                name: "WEBSITE_URL".to_string(),
            })?,
            jwt_algorithm: Algorithm::HS256,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user_id)
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
    pub nbf: usize,  // not before
    pub iss: String, // issuer
    pub aud: String, // audience
    pub jti: String, // jwt id
}

pub struct TokenService;

impl TokenService {
    /// Tokens are issued by the account service sharing `JWT_SECRET`; this
    /// side only checks them.
    pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims> {
        let mut validation = Validation::new(config.jwt_algorithm);
        validation.set_audience(&[config.website_url.to_string()]);
        validation.set_issuer(&[config.website_url.to_string()]);

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )?;
        Ok(decoded.claims)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{create_token, test_config};
    use super::*;

    #[test]
    fn test_validate_token() {
        let config = test_config();
        let token = create_token("65f0a1b2c3d4e5f6a7b8c9d0", &config);

        let claims = TokenService::validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "65f0a1b2c3d4e5f6a7b8c9d0");
    }

    #[test]
    fn test_reject_foreign_token() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "another-secret".to_string();
        let token = create_token("65f0a1b2c3d4e5f6a7b8c9d0", &other);

        assert!(matches!(
            TokenService::validate_token(&token, &config),
            Err(Error::AuthFailTokenWrongFormat)
        ));
        assert!(TokenService::validate_token("garbage", &config).is_err());
    }
}
