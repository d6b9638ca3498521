use base64::Engine;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub refresh_cookie: String,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Raw 64-byte signing/encryption key; `None` means generate one at startup.
    pub key: Option<Vec<u8>>,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub social_email: String,
    pub nickname: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtSettings,
    pub session: SessionSettings,
    pub allowed_origins: Vec<String>,
    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let port = or_default("PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid { name: "PORT", reason: e.to_string() })?;

        let store = match or_default("USER_STORE", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => StoreBackend::MongoDb,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "USER_STORE",
                    reason: format!("unknown backend '{}', expected mongodb or memory", other),
                })
            }
        };

        let database_url = get("DATABASE_URL");
        if store == StoreBackend::MongoDb && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt = JwtSettings {
            secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            issuer: or_default("JWT_ISSUER", "clearplate"),
            audience: or_default("JWT_AUDIENCE", "clearplate-api"),
            refresh_cookie: or_default("REFRESH_TOKEN_COOKIE", "refresh_token"),
        };

        let session_key = match get("SESSION_KEY") {
            Some(encoded) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| ConfigError::Invalid { name: "SESSION_KEY", reason: e.to_string() })?;
                if bytes.len() < 64 {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_KEY",
                        reason: format!("expected at least 64 bytes, got {}", bytes.len()),
                    });
                }
                Some(bytes)
            }
            None => None,
        };

        let cookie_secure = match or_default("COOKIE_SECURE", "true").to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::Invalid {
                    name: "COOKIE_SECURE",
                    reason: format!("expected a boolean, got '{}'", other),
                })
            }
        };

        let allowed_origins = or_default("ALLOWED_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let seed_admin = get("SEED_ADMIN_EMAIL").map(|social_email| SeedAdmin {
            social_email,
            nickname: or_default("SEED_ADMIN_NICKNAME", "admin"),
        });

        Ok(Self {
            host: or_default("HOST", "0.0.0.0"),
            port,
            store,
            database_url,
            jwt,
            session: SessionSettings {
                key: session_key,
                cookie_name: or_default("SESSION_COOKIE_NAME", "SESSION"),
                cookie_secure,
            },
            allowed_origins,
            seed_admin,
        })
    }
}
