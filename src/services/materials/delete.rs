use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MaterialService, load_material_with_group, material_permission_denied};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::groups::can_manage_group;
use crate::services::{current_user, internal_error, not_found};

pub async fn delete_material(
    service: &MaterialService,
    material_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let (_, group) = match load_material_with_group(&storage, material_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !can_manage_group(&user, &group) {
        return Ok(material_permission_denied());
    }

    match storage.delete_material(material_id).await {
        Ok(true) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Material deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::MaterialNotFound, "Material not found")),
        Err(e) => Ok(internal_error("Failed to delete material", e)),
    }
}
