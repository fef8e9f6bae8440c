use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, requests::UpdateUserRequest},
};
use crate::services::{bad_request, internal_error, not_found};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_name, validate_password_simple,
};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = update_data.name.as_mut() {
        *name = name.trim().to_string();
        if let Err(msg) = validate_name(name) {
            return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
        }
    }

    if let Some(email) = update_data.email.as_mut() {
        *email = normalize_email(email);
        if let Err(msg) = validate_email(email) {
            return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
        }
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password_simple(&password) {
            return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
        }
        match hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => return Ok(internal_error("Password hashing failed", e)),
        }
    }

    let storage = service.get_storage(request)?;

    // 带班教师改为其他角色会破坏小组的教师约束
    if update_data.role.is_some_and(|role| role != UserRole::Teacher)
        && let Err(response) = super::ensure_no_groups_taught(&storage, user_id).await
    {
        return Ok(response);
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            service.invalidate_session(request, user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "User information updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Email already exists",
        ))),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            format!("Failed to update user information: {e}"),
        ))),
    }
}
