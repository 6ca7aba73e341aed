use std::env;
use std::fmt;

/// Deployment environment. Outgoing email is only delivered in `Prod` and `Dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Prod,
    Dev,
    Test,
}

impl AppEnv {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "prod" => Some(AppEnv::Prod),
            "dev" => Some(AppEnv::Dev),
            "test" => Some(AppEnv::Test),
            _ => None,
        }
    }

    pub fn sends_email(self) -> bool {
        matches!(self, AppEnv::Prod | AppEnv::Dev)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set", name),
            ConfigError::Invalid(name, value) => write!(f, "{} has invalid value {:?}", name, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub max_connection_count: u32,
    pub min_connection_count: u32,
    pub mailgun_api_key: Option<String>,
    pub mailgun_domain: String,
    /// Host that serves this API, used in email confirmation links.
    pub public_host: String,
    /// Host of the web client, used in password reset links.
    pub frontend_host: String,
    pub verified_redirect_url: String,
    pub welcome_redirect_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default =
            |name: &'static str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let app_env = match lookup("APP_ENV") {
            Some(value) => {
                AppEnv::parse(&value).ok_or(ConfigError::Invalid("APP_ENV", value))?
            }
            None => AppEnv::Prod,
        };

        Ok(Self {
            app_env,
            database_url: required("DATABASE_URL")?,
            server_port: parse_number(&lookup, "SERVER_PORT", 8080)?,
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            jwt_secret: required("JWT_SECRET")?,
            max_connection_count: parse_number(&lookup, "MAX_CONNECTION_COUNT", 10)?,
            min_connection_count: parse_number(&lookup, "MIN_CONNECTION_COUNT", 10)?,
            mailgun_api_key: lookup("MAILGUN_API_KEY").filter(|key| !key.is_empty()),
            mailgun_domain: or_default("MAILGUN_DOMAIN", "mail.taskhive.app"),
            public_host: or_default("PUBLIC_HOST", "localhost:8080"),
            frontend_host: or_default("FRONTEND_HOST", "localhost:5173"),
            verified_redirect_url: or_default("VERIFIED_REDIRECT_URL", "https://taskhive.app"),
            welcome_redirect_url: or_default(
                "WELCOME_REDIRECT_URL",
                "https://taskhive.app/pricing",
            ),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid(name, value)),
        None => Ok(default),
    }
}
