use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{Result, TutorCenterError};
use crate::models::users::entities::UserRole;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::normalize_email;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_ADMIN_EMAIL: &str = "admin@tutorcenter.local";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 按名称构造缓存后端
async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        TutorCenterError::cache_plugin_not_found(format!("Cache backend '{name}' not registered"))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到 Moka
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = AppConfig::get().cache.cache_type.as_str();
    warn!("Attempting to create {} cache backend", cache_type);

    match build_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}, falling back to memory cache", cache_type, e);
            let cache = build_cache("moka").await?;
            warn!("Successfully created fallback Moka (in-memory) cache backend");
            Ok(cache)
        }
        Err(e) => Err(e),
    }
}

/// 生成随机密码，保证包含大小写字母和数字
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";
    let mut rng = rand::rng();
    let mut password: String = ["ABCDEFGHJKLMNPQRSTUVWXYZ", "abcdefghijkmnpqrstuvwxyz", "23456789"]
        .iter()
        .map(|set| {
            let bytes = set.as_bytes();
            bytes[rng.random_range(0..bytes.len())] as char
        })
        .collect();
    while password.len() < length {
        password.push(CHARSET[rng.random_range(0..CHARSET.len())] as char);
    }
    password
}

/// 用户表为空时创建管理员账号
async fn seed_admin(storage: &Arc<dyn Storage>) -> Result<()> {
    let count = storage.count_users().await?;
    if count > 0 {
        debug!("Database already has {} user(s), skipping admin seed", count);
        return Ok(());
    }
    info!("No users found in database, creating default admin account...");

    let email = std::env::var("ADMIN_EMAIL")
        .map(|email| normalize_email(&email))
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Admin email: {}", email);
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let user = storage
        .create_user(CreateUserRequest {
            name: "Administrator".to_string(),
            email,
            password: hash_password(&password)?,
            role: UserRole::Admin,
            is_active: Some(true),
        })
        .await?;
    info!(
        "Default admin account created successfully (ID: {}, email: {})",
        user.id, user.email
    );
    Ok(())
}

/// 准备服务器启动的上下文：存储、管理员账号和缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，可以忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    if let Err(e) = seed_admin(&storage).await {
        warn!("Failed to seed admin account: {}", e);
    }

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SeaOrmStorage;

    #[test]
    fn test_generated_password_meets_policy() {
        for _ in 0..20 {
            let password = generate_random_password(16);
            assert_eq!(password.len(), 16);
            assert!(crate::utils::validate::validate_password_simple(&password).is_ok());
        }
    }

    #[tokio::test]
    async fn test_seed_admin_only_when_empty() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        seed_admin(&storage).await.unwrap();
        assert_eq!(storage.count_users().await.unwrap(), 1);

        seed_admin(&storage).await.unwrap();
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
