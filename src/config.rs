use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl PoolConfig {
    fn from_env() -> Self {
        Self {
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            acquire_timeout_secs: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(2),
        }
    }
}

/// Configuration for the user (identity) service.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub pool: PoolConfig,
}

impl IdentityConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("USER_DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
        };
        Ok(Self {
            database_url,
            jwt,
            pool: PoolConfig::from_env(),
        })
    }
}

/// Configuration for the task service.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub database_url: String,
    pub pool: PoolConfig,
}

impl TaskConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("TASK_DATABASE_URL")?;
        Ok(Self {
            database_url,
            pool: PoolConfig::from_env(),
        })
    }
}
