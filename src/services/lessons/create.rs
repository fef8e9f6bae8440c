use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LessonService, lesson_detail_response, lesson_permission_denied};
use crate::models::{
    ErrorCode,
    lessons::{entities::resolve_lesson_datetime, requests::CreateLessonRequest},
};
use crate::services::groups::can_manage_group;
use crate::services::{bad_request, current_user, internal_error, not_found};

pub async fn create_lesson(
    service: &LessonService,
    lesson_data: CreateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let group = match storage.get_group_by_id(lesson_data.group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => return Ok(internal_error("Failed to get group", e)),
    };
    // 教师只能为自己的小组排课
    if !can_manage_group(&user, &group) {
        return Ok(lesson_permission_denied());
    }

    let date_time = match resolve_lesson_datetime(
        lesson_data.date_time.as_deref(),
        lesson_data.date.as_deref(),
        lesson_data.time.as_deref(),
    ) {
        Ok(dt) => dt,
        Err(e) => return Ok(bad_request(ErrorCode::LessonDateTimeInvalid, e.message())),
    };

    // 考勤记录在同一事务中按当前名单生成
    let lesson = match storage.create_lesson(lesson_data, date_time).await {
        Ok(lesson) => lesson,
        Err(e) => return Ok(internal_error("Failed to create lesson", e)),
    };
    info!(
        "Lesson {} scheduled for group {} at {} with {} attendance records",
        lesson.id,
        lesson.group_id,
        lesson.date_time,
        lesson.attendance.len()
    );

    Ok(lesson_detail_response(
        &storage,
        lesson.id,
        HttpResponse::Created(),
        "Lesson created successfully",
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, new_storage, request_as, seed_course, seed_group, seed_user,
    };

    fn lesson_request(group_id: i64) -> CreateLessonRequest {
        CreateLessonRequest {
            group_id,
            date_time: None,
            date: Some("2025-09-01".to_string()),
            time: Some("18:30".to_string()),
            topic: Some("Past Simple".to_string()),
            duration: None,
            format: None,
        }
    }

    #[actix_web::test]
    async fn test_create_lesson_seeds_attendance() {
        let storage = new_storage().await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let anna = seed_user(&storage, "anna@example.com", UserRole::Student).await;
        let max = seed_user(&storage, "max@example.com", UserRole::Student).await;
        let course = seed_course(&storage, "English", 300.0).await;
        let group = seed_group(&storage, course.id, teacher.id, vec![anna.id, max.id]).await;

        let resp = LessonService::new_lazy()
            .create_lesson(lesson_request(group.id), &request_as(&storage, Some(&teacher)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let body = body_json(resp).await;
        assert_eq!(body["data"]["date_time"], "2025-09-01T18:30:00Z");
        assert_eq!(body["data"]["group"]["name"], group.name);
        let attendance = body["data"]["attendance"].as_array().unwrap();
        assert_eq!(attendance.len(), 2);
        assert!(attendance.iter().all(|a| a["status"] == "absent"));
        assert_eq!(attendance[0]["student_name"], "anna");
    }

    #[actix_web::test]
    async fn test_create_lesson_permissions_and_validation() {
        let storage = new_storage().await;
        let owner = seed_user(&storage, "owner@example.com", UserRole::Teacher).await;
        let other = seed_user(&storage, "other@example.com", UserRole::Teacher).await;
        let admin = seed_user(&storage, "admin@example.com", UserRole::Admin).await;
        let course = seed_course(&storage, "Chemistry", 500.0).await;
        let group = seed_group(&storage, course.id, owner.id, Vec::new()).await;
        let service = LessonService::new_lazy();

        let resp = service
            .create_lesson(lesson_request(group.id), &request_as(&storage, Some(&other)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 403);

        let mut missing_time = lesson_request(group.id);
        missing_time.time = None;
        let resp = service
            .create_lesson(missing_time, &request_as(&storage, Some(&owner)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        // 空名单得到空考勤
        let resp = service
            .create_lesson(lesson_request(group.id), &request_as(&storage, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body = body_json(resp).await;
        assert!(body["data"]["attendance"].as_array().unwrap().is_empty());

        let resp = service
            .create_lesson(lesson_request(group.id + 50), &request_as(&storage, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }
}
