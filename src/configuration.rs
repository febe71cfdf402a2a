use crate::auth::{SigningKey, TokenPurpose};
use crate::error::ConfigError;

const MIN_SECRET_LENGTH: usize = 32;
const MAX_TOKEN_EXPIRY: i64 = 10 * 365 * 24 * 60 * 60;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub hashing: HashingSettings,
    /// Accounts are kept in memory when no database is configured
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct HashingSettings {
    pub bcrypt_cost: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// JWT signing settings
///
/// Access and refresh tokens are signed with separate secrets.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry: i64,  // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
}

impl JwtSettings {
    pub fn access_key(&self) -> SigningKey {
        SigningKey::new(TokenPurpose::Access, &self.access_secret)
    }

    pub fn refresh_key(&self) -> SigningKey {
        SigningKey::new(TokenPurpose::Refresh, &self.refresh_secret)
    }

    /// Reject settings that would weaken token separation or integrity
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secret) in [
            ("jwt.access_secret", &self.access_secret),
            ("jwt.refresh_secret", &self.refresh_secret),
        ] {
            if secret.is_empty() {
                return Err(ConfigError::MissingRequired(name.to_string()));
            }
            if secret.len() < MIN_SECRET_LENGTH {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be at least {} characters",
                    name, MIN_SECRET_LENGTH
                )));
            }
        }

        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::InvalidValue(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "token expiries must be positive".to_string(),
            ));
        }

        if self.access_token_expiry > MAX_TOKEN_EXPIRY || self.refresh_token_expiry > MAX_TOKEN_EXPIRY {
            return Err(ConfigError::InvalidValue(format!(
                "token expiries must not exceed {} seconds",
                MAX_TOKEN_EXPIRY
            )));
        }

        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.issuer".to_string()));
        }

        Ok(())
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.hashing.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "hashing.bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }

        Ok(())
    }
}

/// Load settings from `configuration.{yaml,toml,json}` and `APP__*` environment
/// variables (e.g. `APP__JWT__ACCESS_SECRET`), then validate them.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_settings() -> JwtSettings {
        JwtSettings {
            access_secret: "access-secret-key-at-least-32-characters".to_string(),
            refresh_secret: "refresh-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    #[test]
    fn test_valid_jwt_settings() {
        assert!(jwt_settings().validate().is_ok());
    }

    #[test]
    fn test_shared_secret_is_rejected() {
        let mut config = jwt_settings();
        config.refresh_secret = config.access_secret.clone();

        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let mut config = jwt_settings();
        config.access_secret = "short".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_is_rejected() {
        let mut config = jwt_settings();
        config.access_token_expiry = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_expiry_is_rejected() {
        let mut config = jwt_settings();
        config.refresh_token_expiry = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        config.refresh_token_expiry = MAX_TOKEN_EXPIRY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_keys_carry_their_purpose() {
        let config = jwt_settings();

        assert_eq!(config.access_key().purpose(), TokenPurpose::Access);
        assert_eq!(config.refresh_key().purpose(), TokenPurpose::Refresh);
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let settings = Settings {
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            jwt: jwt_settings(),
            hashing: HashingSettings { bcrypt_cost: 99 },
            database: None,
        };

        assert!(settings.validate().is_err());
    }
}
