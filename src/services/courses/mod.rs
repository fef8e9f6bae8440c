pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::courses::requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest};
use crate::models::groups::entities::dedup_ids;
use crate::models::users::entities::UserRole;
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    pub async fn create_course(
        &self,
        course_data: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, course_data, request).await
    }

    pub async fn get_course(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_course(self, course_id, request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        update_data: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, course_id, update_data, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, course_id, request).await
    }
}

/// 标题去空白后不能为空
pub(crate) fn normalize_title(title: &str) -> Result<String, HttpResponse> {
    let title = title.trim();
    if title.is_empty() {
        return Err(super::bad_request(
            ErrorCode::CourseTitleInvalid,
            "Course title must not be empty",
        ));
    }
    Ok(title.to_string())
}

/// teacher_ids 中的每个用户都必须存在且角色为教师，返回去重后的列表
pub(crate) async fn check_teacher_ids(
    storage: &Arc<dyn Storage>,
    teacher_ids: &[i64],
) -> Result<Vec<i64>, HttpResponse> {
    let ids = dedup_ids(teacher_ids);
    let users = storage
        .get_users_by_ids(&ids)
        .await
        .map_err(|e| super::internal_error("Failed to load teachers", e))?;

    let teachers = users.iter().filter(|u| u.role == UserRole::Teacher).count();
    if teachers != ids.len() {
        return Err(super::bad_request(
            ErrorCode::CourseTeacherInvalid,
            "Every teacher_ids entry must reference a teacher",
        ));
    }
    Ok(ids)
}
