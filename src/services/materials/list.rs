use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MaterialService;
use crate::models::{ApiResponse, ErrorCode, materials::responses::MaterialListResponse};
use crate::services::groups::can_view_group;
use crate::services::lessons::load_lesson_with_group;
use crate::services::{current_user, forbidden, internal_error};

pub async fn list_lesson_materials(
    service: &MaterialService,
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
            ErrorCode::MaterialPermissionDenied,
            "You do not have access to materials of this lesson",
        ));
    }

    match storage.list_materials_by_lesson(lesson_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MaterialListResponse { items },
            "Materials retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve materials", e)),
    }
}
