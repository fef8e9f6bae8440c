use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GroupService, check_course_exists, check_students, check_teacher, normalize_group_name};
use crate::models::{ApiResponse, ErrorCode, groups::requests::CreateGroupRequest};
use crate::services::{internal_error, not_found};

pub async fn create_group(
    service: &GroupService,
    mut group_data: CreateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    group_data.name = match normalize_group_name(&group_data.name) {
        Ok(name) => name,
        Err(response) => return Ok(response),
    };
    if let Err(response) = check_course_exists(&storage, group_data.course_id).await {
        return Ok(response);
    }
    if let Err(response) = check_teacher(&storage, group_data.teacher_id).await {
        return Ok(response);
    }
    group_data.student_ids = match check_students(&storage, &group_data.student_ids).await {
        Ok(ids) => ids,
        Err(response) => return Ok(response),
    };

    let group = match storage.create_group(group_data).await {
        Ok(group) => group,
        Err(e) => return Ok(internal_error("Failed to create group", e)),
    };
    info!(
        "Group '{}' created with {} students",
        group.name,
        group.student_ids.len()
    );

    match storage.get_group_detail(group.id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Created().json(ApiResponse::success(
            detail,
            "Group created successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Ok(internal_error("Failed to load created group", e)),
    }
}
