/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <token>` 中的 access token，并把当前用户放入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::scope("/api/v1/groups")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_groups))
 * ```
 *
 * 处理程序中通过 `RequireJWT::extract_user_claims(&req)` 获取当前用户。
 *
 * ## 认证流程
 *
 * 1. 校验 token 签名、过期时间和类型（必须是 access token）
 * 2. 按 `user:{id}` 从对象缓存读取用户，未命中时查询存储并回填缓存
 * 3. 用户不存在返回 401，账号被停用返回 403
 */

use crate::cache::{CacheResult, ObjectCache, user_cache_key};
use crate::config::AppConfig;
use crate::models::users::entities::{User, UserRole};
use crate::models::ErrorCode;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

struct AuthRejection {
    status: StatusCode,
    code: ErrorCode,
    message: &'static str,
}

impl AuthRejection {
    fn unauthorized(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: ErrorCode::Unauthorized,
            message,
        }
    }

    fn into_response(self) -> HttpResponse {
        create_error_response(self.status, self.code, self.message)
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// 提取并验证 access token，返回当前用户
async fn authenticate(req: &ServiceRequest) -> Result<User, AuthRejection> {
    let token = bearer_token(req)
        .ok_or_else(|| AuthRejection::unauthorized("Missing or invalid Authorization header"))?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthRejection::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AuthRejection::unauthorized("Invalid user ID in token"))?;

    let internal = || AuthRejection {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: ErrorCode::InternalServerError,
        message: "Authentication backend unavailable",
    };

    let cache = req
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    let cache_key = user_cache_key(user_id);
    let cached = match &cache {
        Some(cache) => cache.get_json::<User>(&cache_key).await,
        None => CacheResult::NotFound,
    };

    let user = match cached {
        CacheResult::Found(user) => user,
        _ => {
            let storage = req
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .map(|data| data.get_ref().clone())
                .ok_or_else(|| {
                    error!("Storage not found in app data");
                    internal()
                })?;

            let user = storage
                .get_user_by_id(user_id)
                .await
                .map_err(|e| {
                    error!("Failed to load user {}: {}", user_id, e);
                    internal()
                })?
                .ok_or_else(|| AuthRejection::unauthorized("User not found"))?;

            if let Some(cache) = &cache {
                cache
                    .insert_json(cache_key, &user, AppConfig::get().cache.default_ttl)
                    .await;
            }
            user
        }
    };

    if !user.is_active {
        return Err(AuthRejection {
            status: StatusCode::FORBIDDEN,
            code: ErrorCode::UserAccountInactive,
            message: "User account is inactive",
        });
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // CORS 预检请求不需要认证
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(rejection) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        rejection.message
                    );
                    Ok(req.into_response(rejection.into_response().map_into_right_body()))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中提取当前用户
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }
}
