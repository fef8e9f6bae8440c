pub mod create;
pub mod delete;
pub mod grade;
pub mod list;
pub mod submissions;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::groups::entities::Group;
use crate::models::materials::{entities::Material, requests::CreateMaterialRequest};
use crate::models::submissions::requests::{GradeSubmissionRequest, SubmitAssignmentRequest};
use crate::storage::Storage;

pub struct MaterialService {
    storage: Option<Arc<dyn Storage>>,
}

impl MaterialService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_material(
        &self,
        material_data: CreateMaterialRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_material(self, material_data, request).await
    }

    pub async fn list_lesson_materials(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_lesson_materials(self, lesson_id, request).await
    }

    pub async fn delete_material(
        &self,
        material_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_material(self, material_id, request).await
    }

    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        submission_data: SubmitAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_assignment(self, assignment_id, submission_data, request).await
    }

    pub async fn list_submissions(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submissions::list_submissions(self, assignment_id, request).await
    }

    pub async fn list_my_submissions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        submissions::list_my_submissions(self, request).await
    }

    pub async fn grade_submission(
        &self,
        submission_id: i64,
        grade_data: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, submission_id, grade_data, request).await
    }
}

/// 读取材料及其课时所属的小组
pub(crate) async fn load_material_with_group(
    storage: &Arc<dyn Storage>,
    material_id: i64,
) -> Result<(Material, Group), HttpResponse> {
    let material = match storage.get_material_by_id(material_id).await {
        Ok(Some(material)) => material,
        Ok(None) => return Err(super::not_found(ErrorCode::MaterialNotFound, "Material not found")),
        Err(e) => return Err(super::internal_error("Failed to get material", e)),
    };
    let (_, group) = super::lessons::load_lesson_with_group(storage, material.lesson_id).await?;
    Ok((material, group))
}

/// 只有 assignment 类型的材料可以提交和批改
pub(crate) async fn load_assignment_with_group(
    storage: &Arc<dyn Storage>,
    assignment_id: i64,
) -> Result<(Material, Group), HttpResponse> {
    match load_material_with_group(storage, assignment_id).await {
        Ok((material, group)) if material.is_assignment() => Ok((material, group)),
        Ok(_) => Err(super::not_found(ErrorCode::AssignmentNotFound, "Assignment not found")),
        Err(response) => Err(response),
    }
}

pub(crate) fn material_permission_denied() -> HttpResponse {
    super::forbidden(
        ErrorCode::MaterialPermissionDenied,
        "Only the group teacher or an admin can manage materials of this lesson",
    )
}
