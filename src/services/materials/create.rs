use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{MaterialService, material_permission_denied};
use crate::models::{
    ApiResponse, ErrorCode, lessons::entities::parse_datetime,
    materials::requests::CreateMaterialRequest,
};
use crate::services::groups::can_manage_group;
use crate::services::lessons::load_lesson_with_group;
use crate::services::{bad_request, current_user, internal_error};

pub async fn create_material(
    service: &MaterialService,
    mut material_data: CreateMaterialRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    material_data.title = material_data.title.trim().to_string();
    if material_data.title.is_empty() {
        return Ok(bad_request(
            ErrorCode::MaterialTitleInvalid,
            "Material title must not be empty",
        ));
    }

    let due_date = match material_data.due_date.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => match parse_datetime(value) {
            Ok(dt) => Some(dt),
            Err(e) => return Ok(bad_request(ErrorCode::BadRequest, e.message())),
        },
        _ => None,
    };

    let storage = service.get_storage(request)?;
    let (lesson, group) = match load_lesson_with_group(&storage, material_data.lesson_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !can_manage_group(&user, &group) {
        return Ok(material_permission_denied());
    }

    // 材料始终归属于小组教师，即使由管理员添加
    match storage
        .create_material(material_data, group.teacher_id, due_date)
        .await
    {
        Ok(material) => {
            info!(
                "Material '{}' ({}) added to lesson {}",
                material.title,
                material.material_type.as_str(),
                lesson.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                material,
                "Material created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create material", e)),
    }
}
