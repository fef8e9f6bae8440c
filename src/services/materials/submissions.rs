use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MaterialService, load_assignment_with_group, material_permission_denied};
use crate::models::ApiResponse;
use crate::models::submissions::responses::{MySubmissionListResponse, SubmissionListResponse};
use crate::services::groups::can_manage_group;
use crate::services::{current_user, internal_error};

pub async fn list_submissions(
    service: &MaterialService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let (_, group) = match load_assignment_with_group(&storage, assignment_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !can_manage_group(&user, &group) {
        return Ok(material_permission_denied());
    }

    match storage.list_submissions_by_material(assignment_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse { items },
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve submissions", e)),
    }
}

pub async fn list_my_submissions(
    service: &MaterialService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    match storage.list_submissions_by_student(user.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MySubmissionListResponse { items },
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve submissions", e)),
    }
}
