use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("MYGRAM_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("MYGRAM_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let host = var("MYGRAM_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("MYGRAM_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("port must be a number between 0 and 65535")?;
        let addr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let db_path = var("MYGRAM_DB_PATH")
            .unwrap_or_else(|| "mygram.db".into())
            .into();

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("MYGRAM_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("mygram.db"));
    }

    #[test]
    fn placeholder_secrets_are_refused() {
        assert!(load(&[]).is_err());
        assert!(load(&[("MYGRAM_JWT_SECRET", "")]).is_err());
        assert!(load(&[("MYGRAM_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn plain_port_is_a_fallback() {
        let config = load(&[("MYGRAM_JWT_SECRET", "s3cr3t!"), ("PORT", "9000")]).unwrap();
        assert_eq!(config.addr.port(), 9000);

        let config = load(&[
            ("MYGRAM_JWT_SECRET", "s3cr3t!"),
            ("PORT", "9000"),
            ("MYGRAM_PORT", "9100"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 9100);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(load(&[("MYGRAM_JWT_SECRET", "s3cr3t!"), ("MYGRAM_PORT", "http")]).is_err());
    }
}
