use serde::Deserialize;
use std::env;
use travlr_core::identity::DEFAULT_BCRYPT_COST;
use travlr_shared::Masked;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Required. There is deliberately no default.
    pub jwt_secret: Masked<String>,
    /// Sets the `Secure` attribute on the session cookie.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_secure_cookies() -> bool { true }
fn default_bcrypt_cost() -> u32 { DEFAULT_BCRYPT_COST }

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Postgres connection string. Without one the server keeps data in memory.
    #[serde(default)]
    pub url: Option<String>,
}

/// Run mode used when `RUN_MODE` is not set. Only an explicit
/// `RUN_MODE=development` loads the relaxed local settings.
pub const DEFAULT_RUN_MODE: &str = "production";

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").ok();
        Self::sources("config", run_mode.as_deref())
            .build()?
            .try_deserialize()
    }

    /// The layered sources under `dir`: defaults, the run mode file, local
    /// overrides, then `TRAVLR__*` environment variables.
    pub fn sources(
        dir: &str,
        run_mode: Option<&str>,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        let run_mode = run_mode.unwrap_or(DEFAULT_RUN_MODE);

        config::Config::builder()
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Local, uncommitted overrides
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // e.g. `TRAVLR__AUTH__JWT_SECRET=...`
            .add_source(config::Environment::with_prefix("TRAVLR").separator("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_fill_optional_settings() {
        let config = parse(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert!(config.auth.secure_cookies);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert_eq!(config.auth.jwt_secret.expose(), "s3cret");
    }

    #[test]
    fn test_missing_secret_fails() {
        let result = parse(
            r#"
            [server]
            port = 8080

            [auth]
            secure_cookies = false
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = parse(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "do-not-print-me"
            "#,
        )
        .unwrap();
        assert!(!format!("{:?}", config).contains("do-not-print-me"));
    }

    fn load_shipped(run_mode: Option<&str>) -> Config {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");
        Config::sources(dir, run_mode)
            .set_override("auth.jwt_secret", "s3cret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_cookies_are_secure_without_run_mode() {
        let config = load_shipped(None);
        assert!(config.auth.secure_cookies);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_development_mode_relaxes_cookies() {
        assert!(!load_shipped(Some("development")).auth.secure_cookies);
        assert!(load_shipped(Some("production")).auth.secure_cookies);
    }
}
