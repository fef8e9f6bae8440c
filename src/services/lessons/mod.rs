pub mod attendance;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::groups::entities::Group;
use crate::models::lessons::entities::Lesson;
use crate::models::lessons::requests::{
    CreateLessonRequest, LessonListParams, UpdateAttendanceRequest, UpdateLessonRequest,
};
use crate::storage::Storage;

pub struct LessonService {
    storage: Option<Arc<dyn Storage>>,
}

impl LessonService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_lessons(
        &self,
        query: LessonListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_lessons(self, query, request).await
    }

    pub async fn create_lesson(
        &self,
        lesson_data: CreateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_lesson(self, lesson_data, request).await
    }

    pub async fn get_lesson(&self, lesson_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_lesson(self, lesson_id, request).await
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        update_data: UpdateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_lesson(self, lesson_id, update_data, request).await
    }

    pub async fn update_attendance(
        &self,
        lesson_id: i64,
        attendance_data: UpdateAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        attendance::update_attendance(self, lesson_id, attendance_data, request).await
    }

    pub async fn delete_lesson(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_lesson(self, lesson_id, request).await
    }
}

/// 读取课时及其所属小组
pub(crate) async fn load_lesson_with_group(
    storage: &Arc<dyn Storage>,
    lesson_id: i64,
) -> Result<(Lesson, Group), HttpResponse> {
    let lesson = match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => lesson,
        Ok(None) => return Err(super::not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => return Err(super::internal_error("Failed to get lesson", e)),
    };

    match storage.get_group_by_id(lesson.group_id).await {
        Ok(Some(group)) => Ok((lesson, group)),
        Ok(None) => Err(super::not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Err(super::internal_error("Failed to get group", e)),
    }
}

pub(crate) fn lesson_permission_denied() -> HttpResponse {
    super::forbidden(
        ErrorCode::LessonPermissionDenied,
        "Only the group teacher or an admin can manage this lesson",
    )
}

/// 返回填充后的课时
pub(crate) async fn lesson_detail_response(
    storage: &Arc<dyn Storage>,
    lesson_id: i64,
    mut builder: actix_web::HttpResponseBuilder,
    message: &str,
) -> HttpResponse {
    match storage.get_lesson_detail(lesson_id).await {
        Ok(Some(detail)) => builder.json(crate::models::ApiResponse::success(detail, message)),
        Ok(None) => super::not_found(ErrorCode::LessonNotFound, "Lesson not found"),
        Err(e) => super::internal_error("Failed to load lesson", e),
    }
}
