use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GroupService, check_course_exists, check_students, check_teacher, normalize_group_name};
use crate::models::{ApiResponse, ErrorCode, groups::requests::UpdateGroupRequest};
use crate::services::{internal_error, not_found};

pub async fn update_group(
    service: &GroupService,
    group_id: i64,
    mut update_data: UpdateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(name) = &update_data.name {
        match normalize_group_name(name) {
            Ok(name) => update_data.name = Some(name),
            Err(response) => return Ok(response),
        }
    }
    if let Some(course_id) = update_data.course_id
        && let Err(response) = check_course_exists(&storage, course_id).await
    {
        return Ok(response);
    }
    if let Some(teacher_id) = update_data.teacher_id
        && let Err(response) = check_teacher(&storage, teacher_id).await
    {
        return Ok(response);
    }
    if let Some(student_ids) = &update_data.student_ids {
        match check_students(&storage, student_ids).await {
            Ok(ids) => update_data.student_ids = Some(ids),
            Err(response) => return Ok(response),
        }
    }

    // 名单变化不影响已有课时的考勤
    match storage.update_group(group_id, update_data).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => return Ok(internal_error("Failed to update group", e)),
    }

    match storage.get_group_detail(group_id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Group updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Ok(internal_error("Failed to load updated group", e)),
    }
}
