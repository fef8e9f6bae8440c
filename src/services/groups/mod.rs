pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::groups::entities::{Group, dedup_ids};
use crate::models::groups::requests::{CreateGroupRequest, GroupListParams, UpdateGroupRequest};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_groups(
        &self,
        query: GroupListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_groups(self, query, request).await
    }

    pub async fn create_group(
        &self,
        group_data: CreateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_group(self, group_data, request).await
    }

    pub async fn get_group(&self, group_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_group(self, group_id, request).await
    }

    pub async fn update_group(
        &self,
        group_id: i64,
        update_data: UpdateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_group(self, group_id, update_data, request).await
    }

    pub async fn delete_group(
        &self,
        group_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_group(self, group_id, request).await
    }
}

/// 管理员可见全部，教师只能看到自己的小组，学生只能看到所在的小组
pub(crate) fn can_view_group(user: &User, group: &Group) -> bool {
    match user.role {
        UserRole::Admin => true,
        UserRole::Teacher => group.teacher_id == user.id,
        UserRole::Student => group.has_student(user.id),
    }
}

/// 管理员或该小组的教师
pub(crate) fn can_manage_group(user: &User, group: &Group) -> bool {
    user.is_admin() || (user.is_teacher() && group.teacher_id == user.id)
}

pub(crate) fn normalize_group_name(name: &str) -> Result<String, HttpResponse> {
    let name = name.trim();
    if name.is_empty() {
        return Err(super::bad_request(
            ErrorCode::GroupNameInvalid,
            "Group name must not be empty",
        ));
    }
    Ok(name.to_string())
}

pub(crate) async fn check_course_exists(
    storage: &Arc<dyn Storage>,
    course_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(super::not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Err(super::internal_error("Failed to load course", e)),
    }
}

pub(crate) async fn check_teacher(
    storage: &Arc<dyn Storage>,
    teacher_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(teacher_id).await {
        Ok(Some(user)) if user.is_teacher() => Ok(()),
        Ok(_) => Err(super::bad_request(
            ErrorCode::GroupTeacherInvalid,
            "teacher_id must reference a teacher",
        )),
        Err(e) => Err(super::internal_error("Failed to load teacher", e)),
    }
}

/// 名单中的每个用户都必须是学生，返回去重后的名单
pub(crate) async fn check_students(
    storage: &Arc<dyn Storage>,
    student_ids: &[i64],
) -> Result<Vec<i64>, HttpResponse> {
    let ids = dedup_ids(student_ids);
    let users = storage
        .get_users_by_ids(&ids)
        .await
        .map_err(|e| super::internal_error("Failed to load students", e))?;

    if users.iter().filter(|u| u.is_student()).count() != ids.len() {
        return Err(super::bad_request(
            ErrorCode::GroupStudentInvalid,
            "Every student_ids entry must reference a student",
        ));
    }
    Ok(ids)
}
