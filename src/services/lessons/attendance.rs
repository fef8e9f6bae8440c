use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::{LessonService, lesson_detail_response, lesson_permission_denied, load_lesson_with_group};
use crate::models::{ErrorCode, lessons::requests::UpdateAttendanceRequest};
use crate::services::groups::can_manage_group;
use crate::services::{current_user, internal_error, not_found};

/// 只更新课时中已有记录的学生，其余条目忽略
pub async fn update_attendance(
    service: &LessonService,
    lesson_id: i64,
    attendance_data: UpdateAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let (_, group) = match load_lesson_with_group(&storage, lesson_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !can_manage_group(&user, &group) {
        return Ok(lesson_permission_denied());
    }

    debug!(
        "Applying {} attendance updates to lesson {}",
        attendance_data.attendance_updates.len(),
        lesson_id
    );
    match storage
        .update_attendance(lesson_id, attendance_data.attendance_updates)
        .await
    {
        Ok(Some(_)) => Ok(lesson_detail_response(
            &storage,
            lesson_id,
            HttpResponse::Ok(),
            "Attendance updated successfully",
        )
        .await),
        Ok(None) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(internal_error("Failed to update attendance", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lessons::{
        entities::AttendanceStatus,
        requests::{AttendanceUpdate, CreateLessonRequest},
    };
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, new_storage, request_as, seed_course, seed_group, seed_user,
    };

    #[actix_web::test]
    async fn test_group_teacher_marks_attendance() {
        let storage = new_storage().await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let stranger = seed_user(&storage, "stranger@example.com", UserRole::Teacher).await;
        let lina = seed_user(&storage, "lina@example.com", UserRole::Student).await;
        let course = seed_course(&storage, "Biology", 320.0).await;
        let group = seed_group(&storage, course.id, teacher.id, vec![lina.id]).await;
        let lesson = storage
            .create_lesson(
                CreateLessonRequest {
                    group_id: group.id,
                    date_time: None,
                    date: None,
                    time: None,
                    topic: None,
                    duration: None,
                    format: None,
                },
                chrono::Utc::now(),
            )
            .await
            .unwrap();

        let updates = || UpdateAttendanceRequest {
            attendance_updates: vec![
                AttendanceUpdate {
                    student_id: lina.id,
                    status: Some(AttendanceStatus::Late),
                    notes: Some("bus delay".to_string()),
                },
                AttendanceUpdate {
                    student_id: 9999,
                    status: Some(AttendanceStatus::Present),
                    notes: None,
                },
            ],
        };
        let service = LessonService::new_lazy();

        let resp = service
            .update_attendance(lesson.id, updates(), &request_as(&storage, Some(&stranger)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 403);

        let resp = service
            .update_attendance(lesson.id, updates(), &request_as(&storage, Some(&teacher)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body = body_json(resp).await;
        let attendance = body["data"]["attendance"].as_array().unwrap();
        assert_eq!(attendance.len(), 1);
        assert_eq!(attendance[0]["status"], "late");
        assert_eq!(attendance[0]["notes"], "bus delay");
    }
}
