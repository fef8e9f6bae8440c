use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::models::auth::responses::{
    RefreshTokenResponse, TokenVerificationResponse, UserInfoResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::utils::jwt::JwtUtils;

use super::AuthService;

fn refresh_rejected(message: &str) -> HttpResponse {
    // 清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(ErrorCode::RefreshTokenInvalid, message))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let claims = match JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Refresh token rejected: {}", e);
            return Ok(refresh_rejected("Login expired or invalid, please login again"));
        }
    };
    let Some(user_id) = claims.user_id() else {
        return Ok(refresh_rejected("Login expired or invalid, please login again"));
    };

    // 重新读取用户，角色变更和停用立即生效
    let storage = service.get_storage(request)?;
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => return Ok(refresh_rejected("Account no longer available")),
        Err(e) => return Ok(internal_error("Failed to refresh token", e)),
    };

    match JwtUtils::generate_access_token(user.id, user.role.as_str()) {
        Ok(access_token) => {
            info!("Access token refreshed for user {}", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RefreshTokenResponse {
                    access_token,
                    expires_in: JwtUtils::access_token_expires_in(),
                },
                "Token refreshed successfully",
            )))
        }
        Err(e) => Ok(internal_error("Unable to generate token", e)),
    }
}

pub async fn handle_verify_token(
    _service: &AuthService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TokenVerificationResponse { is_valid: true },
        "Token is valid",
    )))
}

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match current_user(request) {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserInfoResponse { user },
            "User information retrieved successfully",
        ))),
        Err(response) => Ok(response),
    }
}
