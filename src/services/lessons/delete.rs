use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LessonService, lesson_permission_denied, load_lesson_with_group};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::groups::can_manage_group;
use crate::services::{current_user, internal_error, not_found};

pub async fn delete_lesson(
    service: &LessonService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let (_, group) = match load_lesson_with_group(&storage, lesson_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !can_manage_group(&user, &group) {
        return Ok(lesson_permission_denied());
    }

    match storage.delete_lesson(lesson_id).await {
        Ok(true) => {
            info!("Lesson {} deleted by user {}", lesson_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Lesson deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(internal_error("Failed to delete lesson", e)),
    }
}
