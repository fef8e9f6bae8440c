use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, check_teacher_ids, normalize_title};
use crate::models::{
    ApiResponse, ErrorCode,
    courses::{entities::validate_price, requests::CreateCourseRequest},
};
use crate::services::{bad_request, internal_error};

pub async fn create_course(
    service: &CourseService,
    mut course_data: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    course_data.title = match normalize_title(&course_data.title) {
        Ok(title) => title,
        Err(response) => return Ok(response),
    };

    if let Some(price) = course_data.price_per_hour
        && let Err(msg) = validate_price(price)
    {
        return Ok(bad_request(ErrorCode::CoursePriceInvalid, msg));
    }

    course_data.teacher_ids = match check_teacher_ids(&storage, &course_data.teacher_ids).await {
        Ok(ids) => ids,
        Err(response) => return Ok(response),
    };

    // 标题唯一
    match storage.get_course_by_title(&course_data.title).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::CourseAlreadyExists,
                "Course title already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to create course", e)),
    }

    match storage.create_course(course_data).await {
        Ok(course) => {
            info!("Course '{}' created", course.title);
            Ok(HttpResponse::Created().json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::CourseAlreadyExists,
            "Course title already exists",
        ))),
        Err(e) => Ok(internal_error("Failed to create course", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::{SeaOrmStorage, Storage};
    use std::sync::Arc;

    fn course(title: &str, teacher_ids: Vec<i64>) -> CreateCourseRequest {
        CreateCourseRequest {
            title: title.to_string(),
            description: None,
            price_per_hour: Some(350.0),
            teacher_ids,
        }
    }

    #[actix_web::test]
    async fn test_create_course_checks_teachers_and_title() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let mut ids = Vec::new();
        for (email, role) in [
            ("teacher@example.com", UserRole::Teacher),
            ("student@example.com", UserRole::Student),
        ] {
            let user = storage
                .create_user(CreateUserRequest {
                    name: email.to_string(),
                    email: email.to_string(),
                    password: "hash".to_string(),
                    role,
                    is_active: None,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let req = request_as(&storage, None);
        let service = CourseService::new_lazy();

        let resp = service
            .create_course(course("English B1", vec![ids[0], ids[1]]), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(body_json(resp).await["code"], ErrorCode::CourseTeacherInvalid as i32);

        let resp = service
            .create_course(course("  English B1 ", vec![ids[0], ids[0]]), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["title"], "English B1");
        assert_eq!(body["data"]["teacher_ids"], serde_json::json!([ids[0]]));

        let resp = service
            .create_course(course("English B1", Vec::new()), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 409);

        let mut negative = course("Maths", Vec::new());
        negative.price_per_hour = Some(-5.0);
        let resp = service.create_course(negative, &req).await.unwrap();
        assert_eq!(resp.status(), 400);
    }
}
