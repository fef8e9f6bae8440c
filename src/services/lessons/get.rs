use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LessonService, lesson_detail_response, load_lesson_with_group};
use crate::models::ErrorCode;
use crate::services::groups::can_view_group;
use crate::services::{current_user, forbidden};

pub async fn get_lesson(
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
    if !can_view_group(&user, &group) {
        return Ok(forbidden(
            ErrorCode::LessonPermissionDenied,
            "You do not have access to this lesson",
        ));
    }

    Ok(lesson_detail_response(
        &storage,
        lesson_id,
        HttpResponse::Ok(),
        "Lesson retrieved successfully",
    )
    .await)
}
