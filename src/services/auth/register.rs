use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::models::{
    ApiResponse, ErrorCode,
    auth::RegisterRequest,
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::services::{bad_request, internal_error};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_name, validate_password_simple,
};

use super::AuthService;
use super::login::session_response;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let email = normalize_email(&register_request.email);

    // 1. 校验姓名、邮箱和密码
    if let Err(msg) = validate_name(&register_request.name) {
        return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
    }
    if let Err(msg) = validate_email(&email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    if let Err(msg) = validate_password_simple(&register_request.password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }

    // 2. 检查邮箱是否已被使用
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Register failed", e)),
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    // 3. 自助注册的账号始终是学生
    let create_request = CreateUserRequest {
        name: register_request.name.trim().to_string(),
        email,
        password: password_hash,
        role: UserRole::Student,
        is_active: Some(true),
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("New student registered: {}", user.email);
            Ok(session_response(
                HttpResponse::Created(),
                user,
                false,
                "Registration successful",
            ))
        }
        // 并发注册时由唯一约束兜底
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Email already exists",
        ))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::RegisterFailed,
            format!("Register failed: {e}"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{SeaOrmStorage, Storage};
    use actix_web::{App, test, web};
    use std::sync::Arc;

    async fn register(
        req: HttpRequest,
        body: web::Json<RegisterRequest>,
    ) -> ActixResult<HttpResponse> {
        AuthService::new_lazy().register(body.into_inner(), &req).await
    }

    #[actix_web::test]
    async fn test_register_creates_student_and_rejects_duplicates() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .route("/register", web::post().to(register)),
        )
        .await;

        let payload = serde_json::json!({
            "name": "Dmytro",
            "email": "Dmytro@Example.com",
            "password": "Passw0rdX",
            "role": "admin"
        });
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["user"]["role"], "student");
        assert!(body["data"]["access_token"].as_str().is_some());

        let stored = storage.get_user_by_email("dmytro@example.com").await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::Student);
        assert_ne!(stored.password_hash, "Passw0rdX");

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }

    #[actix_web::test]
    async fn test_register_validation() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .route("/register", web::post().to(register)),
        )
        .await;

        for (payload, code) in [
            (
                serde_json::json!({ "name": "A", "email": "not-an-email", "password": "Passw0rdX" }),
                ErrorCode::UserEmailInvalid,
            ),
            (
                serde_json::json!({ "name": "A", "email": "a@example.com", "password": "short" }),
                ErrorCode::UserPasswordInvalid,
            ),
            (
                serde_json::json!({ "name": "  ", "email": "a@example.com", "password": "Passw0rdX" }),
                ErrorCode::UserNameInvalid,
            ),
        ] {
            let req = test::TestRequest::post()
                .uri("/register")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], code as i32);
        }
    }
}
