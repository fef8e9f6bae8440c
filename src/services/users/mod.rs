pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::debug;

use crate::cache::user_cache_key;
use crate::models::users::requests::{CreateUserRequest, UpdateUserRequest, UserListParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

fn still_teaching(message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::UserStillTeaching, message))
}

/// 用户仍是某个小组的教师时返回 409
pub(crate) async fn ensure_no_groups_taught(
    storage: &Arc<dyn Storage>,
    user_id: i64,
) -> Result<(), HttpResponse> {
    let groups = storage
        .list_group_ids_by_teacher(user_id)
        .await
        .map_err(|e| super::internal_error("Failed to query teacher groups", e))?;
    if groups.is_empty() {
        Ok(())
    } else {
        Err(still_teaching("User still teaches groups, reassign them first"))
    }
}

/// 删除前检查：带班或名下仍有教学材料的用户不能删除
pub(crate) async fn ensure_deletable(
    storage: &Arc<dyn Storage>,
    user_id: i64,
) -> Result<(), HttpResponse> {
    ensure_no_groups_taught(storage, user_id).await?;
    let materials = storage
        .count_materials_by_teacher(user_id)
        .await
        .map_err(|e| super::internal_error("Failed to query teacher materials", e))?;
    if materials > 0 {
        return Err(still_teaching("User still owns lesson materials"));
    }
    Ok(())
}

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    /// 用户信息变更后清除会话缓存
    pub(crate) async fn invalidate_session(&self, request: &HttpRequest, user_id: i64) {
        if let Some(cache) = super::cache_from_request(request) {
            cache.remove(&user_cache_key(user_id)).await;
            debug!("Invalidated cached session for user {}", user_id);
        }
    }

    // 获取用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建用户
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    // 根据ID获取用户
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 更新用户信息
    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 删除用户
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }
}
