use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, Result as ActixResult};
use tracing::{info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
    users::entities::User,
};
use crate::services::internal_error;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;
use crate::utils::validate::normalize_email;

use super::AuthService;

// 邮箱不存在和密码错误使用同一条消息
const INVALID_CREDENTIALS: &str = "Email or password is incorrect";

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let email = normalize_email(&login_request.email);

    // 1. 根据邮箱获取用户并验证密码
    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) if verify_password(&login_request.password, &user.password_hash) => user,
        Ok(_) => {
            info!("Failed login attempt for {}", email);
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::AuthFailed, INVALID_CREDENTIALS)));
        }
        Err(e) => return Ok(internal_error("Login failed", e)),
    };

    // 2. 停用账号不能登录
    if !user.is_active {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::UserAccountInactive,
            "Account is inactive",
        )));
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    info!("User {} logged in successfully", user.email);
    Ok(session_response(
        HttpResponse::Ok(),
        user,
        login_request.remember_me,
        "Login successful",
    ))
}

/// 生成令牌对，返回 access token 并写入 refresh token cookie
pub(super) fn session_response(
    mut builder: HttpResponseBuilder,
    user: User,
    remember_me: bool,
    message: &str,
) -> HttpResponse {
    let refresh_expiry = JwtUtils::refresh_token_expiry(remember_me);
    let token_pair = match user.generate_token_pair(Some(refresh_expiry)) {
        Ok(pair) => pair,
        Err(e) => return internal_error("Unable to generate token", e),
    };

    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: JwtUtils::access_token_expires_in(),
        user,
        created_at: chrono::Utc::now(),
    };

    builder
        .cookie(JwtUtils::create_refresh_token_cookie(
            &token_pair.refresh_token,
            refresh_expiry,
        ))
        .json(ApiResponse::success(response, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::{SeaOrmStorage, Storage};
    use crate::utils::password::hash_password;
    use actix_web::{App, test, web};
    use std::sync::Arc;

    async fn login(req: HttpRequest, body: web::Json<LoginRequest>) -> ActixResult<HttpResponse> {
        AuthService::new_lazy().login(body.into_inner(), &req).await
    }

    async fn storage_with_user(is_active: bool) -> Arc<dyn Storage> {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        storage
            .create_user(CreateUserRequest {
                name: "Marta".to_string(),
                email: "marta@example.com".to_string(),
                password: hash_password("Secret123").unwrap(),
                role: UserRole::Teacher,
                is_active: Some(is_active),
            })
            .await
            .unwrap();
        storage
    }

    #[actix_web::test]
    async fn test_login_success_sets_cookie() {
        let storage = storage_with_user(true).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .route("/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({
                "email": "  Marta@Example.com ",
                "password": "Secret123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert!(
            resp.response()
                .cookies()
                .any(|c| c.name() == crate::utils::jwt::REFRESH_TOKEN_COOKIE)
        );

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["user"]["email"], "marta@example.com");
        assert!(body["data"]["user"].get("password_hash").is_none());

        let user = storage.get_user_by_email("marta@example.com").await.unwrap().unwrap();
        assert!(user.last_login.is_some());
    }

    #[actix_web::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let storage = storage_with_user(true).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .route("/login", web::post().to(login)),
        )
        .await;

        let mut messages = Vec::new();
        for (email, password) in [
            ("marta@example.com", "Wrong1234"),
            ("nobody@example.com", "Secret123"),
        ] {
            let req = test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({ "email": email, "password": password }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 401);
            let body: serde_json::Value = test::read_body_json(resp).await;
            messages.push(body["message"].clone());
        }
        assert_eq!(messages[0], messages[1]);
    }

    #[actix_web::test]
    async fn test_inactive_account_is_forbidden() {
        let storage = storage_with_user(false).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .route("/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({
                "email": "marta@example.com",
                "password": "Secret123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::UserAccountInactive as i32);
    }
}
