use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GroupService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, not_found};

/// 课时、考勤、材料和提交随小组级联删除
pub async fn delete_group(
    service: &GroupService,
    group_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_group(group_id).await {
        Ok(true) => {
            info!("Group {} deleted", group_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Group deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Ok(internal_error("Failed to delete group", e)),
    }
}
