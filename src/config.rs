use std::env;

#[derive(Debug, Clone)]
pub struct SuperuserConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub superuser: Option<SuperuserConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            superuser: SuperuserConfig::from_env(),
        })
    }
}

impl SuperuserConfig {
    /// Bootstrap account, present only when all three variables are set.
    pub fn from_env() -> Option<Self> {
        let username = env::var("SUPERUSER_USERNAME").ok().filter(|v| !v.is_empty())?;
        let email = env::var("SUPERUSER_EMAIL").ok()?;
        let password = env::var("SUPERUSER_PASSWORD").ok().filter(|v| !v.is_empty())?;
        Some(Self {
            username,
            email,
            password,
        })
    }
}
