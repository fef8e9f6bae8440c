use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LessonService, lesson_detail_response, lesson_permission_denied, load_lesson_with_group};
use crate::models::{
    ErrorCode,
    lessons::{entities::parse_datetime, requests::UpdateLessonRequest},
};
use crate::services::groups::can_manage_group;
use crate::services::{bad_request, current_user, internal_error, not_found};

pub async fn update_lesson(
    service: &LessonService,
    lesson_id: i64,
    update_data: UpdateLessonRequest,
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

    let date_time = match update_data.date_time.as_deref() {
        Some(value) => match parse_datetime(value) {
            Ok(dt) => Some(dt),
            Err(e) => return Ok(bad_request(ErrorCode::LessonDateTimeInvalid, e.message())),
        },
        None => None,
    };

    match storage.update_lesson(lesson_id, date_time, update_data).await {
        Ok(Some(_)) => Ok(lesson_detail_response(
            &storage,
            lesson_id,
            HttpResponse::Ok(),
            "Lesson updated successfully",
        )
        .await),
        Ok(None) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(internal_error("Failed to update lesson", e)),
    }
}
