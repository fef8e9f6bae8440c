use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{MaterialService, load_assignment_with_group};
use crate::models::{ApiResponse, ErrorCode, submissions::requests::SubmitAssignmentRequest};
use crate::services::{current_user, forbidden, internal_error};

pub async fn submit_assignment(
    service: &MaterialService,
    assignment_id: i64,
    submission_data: SubmitAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let (_, group) = match load_assignment_with_group(&storage, assignment_id).await {
        Ok(found) => found,
        Err(response) => return Ok(response),
    };
    if !group.has_student(user.id) {
        return Ok(forbidden(
            ErrorCode::SubmissionPermissionDenied,
            "You are not a member of this group",
        ));
    }

    let submission_url = submission_data
        .submission_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    match storage
        .create_submission(assignment_id, user.id, submission_url)
        .await
    {
        Ok(submission) => {
            info!(
                "Student {} submitted assignment {}",
                user.id, assignment_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                submission,
                "Assignment submitted successfully",
            )))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::SubmissionAlreadyExists,
            "Assignment already submitted",
        ))),
        Err(e) => Ok(internal_error("Failed to submit assignment", e)),
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

    fn submission(url: &str) -> SubmitAssignmentRequest {
        SubmitAssignmentRequest {
            submission_url: Some(url.to_string()),
        }
    }

    #[actix_web::test]
    async fn test_submit_assignment_rules() {
        let storage = new_storage().await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let member = seed_user(&storage, "member@example.com", UserRole::Student).await;
        let outsider = seed_user(&storage, "outsider@example.com", UserRole::Student).await;
        let course = seed_course(&storage, "Literature", 260.0).await;
        let group = seed_group(&storage, course.id, teacher.id, vec![member.id]).await;
        let lesson = seed_lesson(&storage, group.id, chrono::Utc::now()).await;
        let essay = seed_material(&storage, lesson.id, teacher.id, MaterialType::Assignment).await;
        let slides = seed_material(&storage, lesson.id, teacher.id, MaterialType::Document).await;
        let service = MaterialService::new_lazy();

        let resp = service
            .submit_assignment(slides.id, submission("https://docs/1"), &request_as(&storage, Some(&member)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = service
            .submit_assignment(essay.id, submission("https://docs/2"), &request_as(&storage, Some(&outsider)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 403);

        let resp = service
            .submit_assignment(essay.id, submission(" https://docs/3 "), &request_as(&storage, Some(&member)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["submission_url"], "https://docs/3");
        assert_eq!(body["data"]["is_graded"], false);

        let resp = service
            .submit_assignment(essay.id, submission("https://docs/4"), &request_as(&storage, Some(&member)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::SubmissionAlreadyExists as i32);
    }
}
