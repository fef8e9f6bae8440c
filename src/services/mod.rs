pub mod auth;
pub mod courses;
pub mod groups;
pub mod health;
pub mod lessons;
pub mod materials;
pub mod payments;
pub mod users;

pub use auth::AuthService;
pub use courses::CourseService;
pub use groups::GroupService;
pub use health::HealthService;
pub use lessons::LessonService;
pub use materials::MaterialService;
pub use payments::PaymentService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;

/// 从 app data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|storage| storage.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("Storage not available")
        })
}

/// 对象缓存是可选的，未注册时返回 None
pub(crate) fn cache_from_request(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone())
}

/// 当前登录用户，只能在 RequireJWT 之后调用
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

/// 记录日志并返回 500
pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("{context}: {err}"),
    ))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::{HttpMessage, HttpRequest, HttpResponse, test, web};
    use std::sync::Arc;

    use crate::models::courses::{entities::Course, requests::CreateCourseRequest};
    use crate::models::groups::{entities::Group, requests::CreateGroupRequest};
    use crate::models::lessons::{entities::Lesson, requests::CreateLessonRequest};
    use crate::models::materials::{
        entities::{Material, MaterialType},
        requests::CreateMaterialRequest,
    };
    use crate::models::users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    };
    use crate::storage::{SeaOrmStorage, Storage};

    pub async fn new_storage() -> Arc<dyn Storage> {
        Arc::new(SeaOrmStorage::in_memory().await)
    }

    pub async fn seed_user(storage: &Arc<dyn Storage>, email: &str, role: UserRole) -> User {
        storage
            .create_user(CreateUserRequest {
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                password: "hash".to_string(),
                role,
                is_active: None,
            })
            .await
            .unwrap()
    }

    pub async fn seed_course(storage: &Arc<dyn Storage>, title: &str, price: f64) -> Course {
        storage
            .create_course(CreateCourseRequest {
                title: title.to_string(),
                description: None,
                price_per_hour: Some(price),
                teacher_ids: Vec::new(),
            })
            .await
            .unwrap()
    }

    pub async fn seed_group(
        storage: &Arc<dyn Storage>,
        course_id: i64,
        teacher_id: i64,
        student_ids: Vec<i64>,
    ) -> Group {
        storage
            .create_group(CreateGroupRequest {
                name: format!("Group of teacher {teacher_id}"),
                course_id,
                teacher_id,
                student_ids,
                format: None,
            })
            .await
            .unwrap()
    }

    /// 以指定用户身份构造请求，相当于已通过 RequireJWT
    pub fn request_as(storage: &Arc<dyn Storage>, user: Option<&User>) -> HttpRequest {
        let req = test::TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .to_http_request();
        if let Some(user) = user {
            req.extensions_mut().insert(user.clone());
        }
        req
    }

    pub async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn seed_lesson(
        storage: &Arc<dyn Storage>,
        group_id: i64,
        date_time: chrono::DateTime<chrono::Utc>,
    ) -> Lesson {
        storage
            .create_lesson(
                CreateLessonRequest {
                    group_id,
                    date_time: None,
                    date: None,
                    time: None,
                    topic: None,
                    duration: None,
                    format: None,
                },
                date_time,
            )
            .await
            .unwrap()
    }

    pub async fn seed_material(
        storage: &Arc<dyn Storage>,
        lesson_id: i64,
        teacher_id: i64,
        material_type: MaterialType,
    ) -> Material {
        storage
            .create_material(
                CreateMaterialRequest {
                    title: format!("{} for lesson {lesson_id}", material_type.as_str()),
                    lesson_id,
                    material_type,
                    content: None,
                    due_date: None,
                },
                teacher_id,
                None,
            )
            .await
            .unwrap()
    }
}
