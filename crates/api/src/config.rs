//! Application configuration loaded from environment variables.

use catalog_infra::notifications::SmtpConfig;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Credentials of the super admin registered at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSuperAdmin {
    pub email: String,
    pub password: String,
}

/// Server configuration.
///
/// Reads from environment variables (a `.env` file is honoured by `main`):
/// - `HOST` / `PORT`: bind address (default `0.0.0.0:8080`)
/// - `JWT_SECRET`: HS256 signing secret (insecure dev default when unset)
/// - `TOKEN_TTL_MINUTES`: bearer token lifetime (default 120)
/// - `SMTP_*`: see [`SmtpConfig::from_env`]; without it notifications are logged
/// - `SEED_SUPER_ADMIN_EMAIL` / `SEED_SUPER_ADMIN_PASSWORD`: optional bootstrap account
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub smtp: Option<SmtpConfig>,
    pub seed_super_admin: Option<SeedSuperAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let seed_super_admin = match (
            std::env::var("SEED_SUPER_ADMIN_EMAIL"),
            std::env::var("SEED_SUPER_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(SeedSuperAdmin { email, password }),
            _ => None,
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret,
            token_ttl_minutes: std::env::var("TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(120),
            smtp: SmtpConfig::from_env(),
            seed_super_admin,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 120,
            smtp: None,
            seed_super_admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(120));
        assert!(config.smtp.is_none());
    }
}
