use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_ttl_minutes: i64,
    pub confirmation_ttl_minutes: i64,
}

/// External image generator (DeepAI-style form endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub domain: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub url_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Base used to build links sent by email (confirmation, post view).
    pub public_url: String,
    pub jwt: JwtConfig,
    pub generator: GeneratorConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    match raw {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => anyhow::bail!("unsupported JWT_ALGORITHM {other}, expected HS256/HS384/HS512"),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            algorithm: parse_algorithm(&env_or("JWT_ALGORITHM", "HS256"))?,
            access_ttl_minutes: env_parse("JWT_ACCESS_TTL_MINUTES", 30),
            confirmation_ttl_minutes: env_parse("JWT_CONFIRMATION_TTL_MINUTES", 60 * 24),
        };
        let generator = GeneratorConfig {
            endpoint: env_or(
                "DEEPAI_API_URL",
                "https://api.deepai.org/api/cute-creature-generator",
            ),
            api_key: env_or("DEEPAI_API_KEY", ""),
            timeout_secs: env_parse("GENERATOR_TIMEOUT_SECS", 60),
        };
        let mail = MailConfig {
            api_url: env_or("MAILGUN_API_URL", "https://api.mailgun.net/v3"),
            domain: env_or("MAILGUN_DOMAIN", ""),
            api_key: env_or("MAILGUN_API_KEY", ""),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("MINIO_ENDPOINT").context("MINIO_ENDPOINT")?,
            bucket: std::env::var("MINIO_BUCKET").context("MINIO_BUCKET")?,
            access_key: std::env::var("MINIO_ACCESS_KEY").context("MINIO_ACCESS_KEY")?,
            secret_key: std::env::var("MINIO_SECRET_KEY").context("MINIO_SECRET_KEY")?,
            url_ttl_secs: env_parse("UPLOAD_URL_TTL_SECS", 7 * 24 * 60 * 60),
        };
        Ok(Self {
            database_url,
            public_url: env_or("PUBLIC_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            jwt,
            generator,
            mail,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_algorithms() {
        assert_eq!(parse_algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(parse_algorithm("HS512").unwrap(), Algorithm::HS512);
        assert!(parse_algorithm("RS256").is_err());
    }
}
