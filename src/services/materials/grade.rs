use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{MaterialService, load_material_with_group, material_permission_denied};
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::{entities::validate_grade, requests::GradeSubmissionRequest},
};
use crate::services::groups::can_manage_group;
use crate::services::{bad_request, current_user, internal_error, not_found};

pub async fn grade_submission(
    service: &MaterialService,
    submission_id: i64,
    grade_data: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    if let Err(msg) = validate_grade(grade_data.grade) {
        return Ok(bad_request(ErrorCode::SubmissionGradeInvalid, msg));
    }

    let storage = service.get_storage(request)?;
    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => return Ok(not_found(ErrorCode::SubmissionNotFound, "Submission not found")),
        Err(e) => return Ok(internal_error("Failed to get submission", e)),
    };

    let (_, group) = match load_material_with_group(&storage, submission.material_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !can_manage_group(&user, &group) {
        return Ok(material_permission_denied());
    }

    let feedback = grade_data.feedback.filter(|f| !f.trim().is_empty());
    match storage
        .grade_submission(submission_id, grade_data.grade, feedback)
        .await
    {
        Ok(Some(submission)) => {
            info!(
                "Submission {} graded {} by user {}",
                submission_id, grade_data.grade, user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                submission,
                "Submission graded successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::SubmissionNotFound, "Submission not found")),
        Err(e) => Ok(internal_error("Failed to grade submission", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::materials::entities::MaterialType;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, new_storage, request_as, seed_course, seed_group, seed_lesson, seed_material,
        seed_user,
    };

    fn grade(value: f64) -> GradeSubmissionRequest {
        GradeSubmissionRequest {
            grade: value,
            feedback: Some("Well structured".to_string()),
        }
    }

    #[actix_web::test]
    async fn test_grade_submission() {
        let storage = new_storage().await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let other = seed_user(&storage, "other@example.com", UserRole::Teacher).await;
        let student = seed_user(&storage, "student@example.com", UserRole::Student).await;
        let course = seed_course(&storage, "Geography", 240.0).await;
        let group = seed_group(&storage, course.id, teacher.id, vec![student.id]).await;
        let lesson = seed_lesson(&storage, group.id, chrono::Utc::now()).await;
        let task = seed_material(&storage, lesson.id, teacher.id, MaterialType::Assignment).await;
        let submission = storage
            .create_submission(task.id, student.id, None)
            .await
            .unwrap();
        let service = MaterialService::new_lazy();

        let resp = service
            .grade_submission(submission.id, grade(-1.0), &request_as(&storage, Some(&teacher)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = service
            .grade_submission(submission.id, grade(10.0), &request_as(&storage, Some(&other)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 403);

        let resp = service
            .grade_submission(submission.id + 1, grade(10.0), &request_as(&storage, Some(&teacher)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = service
            .grade_submission(submission.id, grade(11.5), &request_as(&storage, Some(&teacher)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["grade"], 11.5);
        assert_eq!(body["data"]["is_graded"], true);
        assert!(body["data"]["graded_at"].is_string());
    }
}
