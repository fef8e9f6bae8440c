use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置：config.toml → config.{APP_ENV}.toml → 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // TUTORCENTER_SERVER__PORT=8080 → server.port
            .add_source(
                Environment::with_prefix("TUTORCENTER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        // PORT 优先级低于 SERVER_PORT
        let port = std::env::var("SERVER_PORT")
            .ok()
            .or_else(|| std::env::var("PORT").ok());

        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", port)?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option(
                "cache.redis.key_prefix",
                std::env::var("REDIS_KEY_PREFIX").ok(),
            )?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers.max(1));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }

    /// CORS 是否允许任意来源
    pub fn cors_allows_any_origin(&self) -> bool {
        self.cors.allowed_origins.is_empty() || self.cors.allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_source() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server_bind_address(), "0.0.0.0:5000");
        assert_eq!(config.cache.cache_type, "moka");
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.cors_allows_any_origin());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                "[server]\nport = 8080\n[cors]\nallowed_origins = [\"http://localhost:3000\"]\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.jwt.access_token_expiry, 15);
        assert!(!config.cors_allows_any_origin());
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_socket_path() {
        let mut config = AppConfig::default();
        assert_eq!(config.unix_socket_path(), None);
        config.server.unix_socket_path = "/tmp/tutorcenter.sock".to_string();
        assert_eq!(config.unix_socket_path(), Some("/tmp/tutorcenter.sock"));
    }
}
