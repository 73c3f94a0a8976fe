//! Server configuration
//!
//! Read once at startup from flags or the environment (`.env` is loaded first
//! by `main`). The result is immutable for the life of the process.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Parser, Debug, Clone)]
#[command(name = "devconnector")]
#[command(about = "Social-profile REST API: accounts, profiles, and a post feed")]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// HTTP port
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "DB_PATH", default_value = "devconnector.db")]
    pub db_path: String,

    /// HMAC secret used to sign auth tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Lifetime of tokens issued on registration, in seconds
    #[arg(long, env = "REGISTER_TOKEN_TTL_SECS", default_value = "18000")]
    pub register_token_ttl_secs: u64,

    /// Lifetime of tokens issued on login, in seconds
    #[arg(long, env = "LOGIN_TOKEN_TTL_SECS", default_value = "3600")]
    pub login_token_ttl_secs: u64,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value = "10")]
    pub bcrypt_cost: u32,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// OAuth app client id, raises the GitHub rate limit
    #[arg(long, env = "GITHUB_CLIENT_ID")]
    pub github_client_id: Option<String>,

    #[arg(long, env = "GITHUB_CLIENT_SECRET", hide_env_values = true)]
    pub github_client_secret: Option<String>,

    /// Timeout for GitHub requests, in seconds
    #[arg(long, env = "GITHUB_TIMEOUT_SECS", default_value = "10")]
    pub github_timeout_secs: u64,
}

/// How long issued tokens stay valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub register: Duration,
    pub login: Duration,
}

impl Config {
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }

    /// Configured secret, or the development fallback with a warning
    pub fn signing_secret(&self) -> String {
        match self.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("⚠️  JWT_SECRET not set, using development secret. SET IT IN PRODUCTION!");
                DEV_JWT_SECRET.to_string()
            }
        }
    }

    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            register: Duration::from_secs(self.register_token_ttl_secs),
            login: Duration::from_secs(self.login_token_ttl_secs),
        }
    }

    pub fn github_timeout(&self) -> Duration {
        Duration::from_secs(self.github_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["devconnector"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--port",
            "8080",
            "--bind-addr",
            "127.0.0.1",
            "--login-token-ttl-secs",
            "60",
            "--jwt-secret",
            "s3cret",
        ]);

        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.token_ttls().login, Duration::from_secs(60));
        assert_eq!(config.signing_secret(), "s3cret");
    }

    #[test]
    fn test_blank_secret_falls_back() {
        let config = parse(&["--jwt-secret", "  "]);
        assert_eq!(config.signing_secret(), DEV_JWT_SECRET);
    }

    #[test]
    fn test_bad_bind_addr() {
        let config = parse(&["--bind-addr", "not-an-ip"]);
        assert!(config.listen_addr().is_err());
    }
}
