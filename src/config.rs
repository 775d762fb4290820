use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_MONGO_URI: &str = "mongodb://mongo-db:27017/mydatabase";
const DEFAULT_PROFILE_API_BASE_URL: &str = "https://ghibliapi.vercel.app";

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub mongo_collection: String,
    pub mongo_timeout: Duration,
    pub profile_api_base_url: String,
    pub profile_api_timeout: Duration,
    /// Scope prefix for the user routes, e.g. `/api`. Empty mounts them at the root.
    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for {}: '{}'", self.key, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = parse_or(&lookup, "PORT", 5000u16)?;
        let mongo_timeout = Duration::from_secs(parse_or(&lookup, "MONGO_TIMEOUT_SECS", 5u64)?);
        let profile_api_timeout =
            Duration::from_secs(parse_or(&lookup, "PROFILE_API_TIMEOUT_SECS", 10u64)?);

        let api_prefix = string_or("API_PREFIX", "");
        let api_prefix = match api_prefix.trim_end_matches('/') {
            "" => String::new(),
            p if p.starts_with('/') => p.to_string(),
            p => format!("/{}", p),
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: string_or("HOST", "0.0.0.0"),
            port,
            mongo_uri: string_or("MONGO_URI", DEFAULT_MONGO_URI),
            mongo_collection: string_or("MONGO_COLLECTION", "users"),
            mongo_timeout,
            profile_api_base_url: string_or("PROFILE_API_BASE_URL", DEFAULT_PROFILE_API_BASE_URL),
            profile_api_timeout,
            api_prefix,
            cors_allowed_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError { key, value: raw }),
        _ => Ok(default),
    }
}
