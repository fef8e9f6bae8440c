use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GroupService, can_view_group};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error, not_found};

pub async fn get_group(
    service: &GroupService,
    group_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let group = match storage.get_group_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => return Ok(internal_error("Failed to get group", e)),
    };

    if !can_view_group(&user, &group) {
        return Ok(forbidden(
            ErrorCode::GroupPermissionDenied,
            "You do not have access to this group",
        ));
    }

    match storage.get_group_detail(group_id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Group retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Ok(internal_error("Failed to get group", e)),
    }
}
