use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, check_teacher_ids, normalize_title};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{entities::validate_price, requests::UpdateCourseRequest},
};
use crate::services::{bad_request, internal_error, not_found};

pub async fn update_course(
    service: &CourseService,
    course_id: i64,
    mut update_data: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(title) = &update_data.title {
        match normalize_title(title) {
            Ok(title) => update_data.title = Some(title),
            Err(response) => return Ok(response),
        }
    }

    if let Some(price) = update_data.price_per_hour
        && let Err(msg) = validate_price(price)
    {
        return Ok(bad_request(ErrorCode::CoursePriceInvalid, msg));
    }

    if let Some(teacher_ids) = &update_data.teacher_ids {
        match check_teacher_ids(&storage, teacher_ids).await {
            Ok(ids) => update_data.teacher_ids = Some(ids),
            Err(response) => return Ok(response),
        }
    }

    match storage.update_course(course_id, update_data).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::CourseAlreadyExists,
            "Course title already exists",
        ))),
        Err(e) => Ok(internal_error("Failed to update course", e)),
    }
}
