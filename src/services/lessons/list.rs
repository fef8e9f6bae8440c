use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use super::LessonService;
use crate::models::{
    ApiResponse, ErrorCode,
    lessons::{
        entities::{parse_datetime, parse_range_end},
        requests::{LessonListParams, LessonListQuery},
    },
    users::entities::UserRole,
};
use crate::services::{bad_request, current_user, internal_error};

fn parse_filter(
    value: Option<&str>,
    parse: fn(&str) -> crate::errors::Result<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>, HttpResponse> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse(value).map(Some).map_err(|e| {
            bad_request(
                ErrorCode::LessonDateTimeInvalid,
                format!("Invalid date filter '{value}': {}", e.message()),
            )
        }),
        None => Ok(None),
    }
}

pub async fn list_lessons(
    service: &LessonService,
    query: LessonListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let (page, size) = query.pagination.normalized();

    let mut list_query = LessonListQuery {
        page: Some(page),
        size: Some(size),
        group_id: query.group_id,
        include_cancelled: query.include_cancelled.unwrap_or(true),
        ..Default::default()
    };

    // 只给日期的 to 包含当天
    match (
        parse_filter(query.from.as_deref(), parse_datetime),
        parse_filter(query.to.as_deref(), parse_range_end),
    ) {
        (Ok(from), Ok(to)) => {
            list_query.from = from;
            list_query.to = to;
        }
        (Err(response), _) | (_, Err(response)) => return Ok(response),
    }

    // 教师和学生只能看到自己小组的课时
    let scope = match user.role {
        UserRole::Admin => None,
        UserRole::Teacher => Some(storage.list_group_ids_by_teacher(user.id).await),
        UserRole::Student => Some(storage.list_group_ids_by_student(user.id).await),
    };
    if let Some(group_ids) = scope {
        match group_ids {
            Ok(ids) => list_query.group_ids = Some(ids),
            Err(e) => return Ok(internal_error("Failed to resolve lesson scope", e)),
        }
    }

    match storage.list_lessons_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Schedule retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve schedule", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::PaginationQuery;
    use crate::models::lessons::requests::CreateLessonRequest;
    use crate::services::test_support::{
        body_json, new_storage, request_as, seed_course, seed_group, seed_user,
    };
    use chrono::TimeZone;

    fn params(from: Option<&str>) -> LessonListParams {
        range(from, None)
    }

    fn range(from: Option<&str>, to: Option<&str>) -> LessonListParams {
        LessonListParams {
            pagination: PaginationQuery { page: 1, size: 20 },
            group_id: None,
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            include_cancelled: None,
        }
    }

    #[actix_web::test]
    async fn test_schedule_scoped_and_sorted() {
        let storage = new_storage().await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let student = seed_user(&storage, "student@example.com", UserRole::Student).await;
        let admin = seed_user(&storage, "admin@example.com", UserRole::Admin).await;
        let course = seed_course(&storage, "History", 280.0).await;
        let mine = seed_group(&storage, course.id, teacher.id, vec![student.id]).await;
        let other = seed_group(&storage, course.id, teacher.id, Vec::new()).await;

        for (group_id, day) in [(mine.id, 20), (mine.id, 5), (other.id, 10)] {
            storage
                .create_lesson(
                    CreateLessonRequest {
                        group_id,
                        date_time: None,
                        date: None,
                        time: None,
                        topic: None,
                        duration: None,
                        format: None,
                    },
                    Utc.with_ymd_and_hms(2025, 10, day, 16, 0, 0).unwrap(),
                )
                .await
                .unwrap();
        }
        let service = LessonService::new_lazy();

        let resp = service
            .list_lessons(params(None), &request_as(&storage, Some(&student)))
            .await
            .unwrap();
        let body = body_json(resp).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["date_time"], "2025-10-05T16:00:00Z");
        assert_eq!(items[1]["date_time"], "2025-10-20T16:00:00Z");

        let resp = service
            .list_lessons(params(Some("2025-10-08")), &request_as(&storage, Some(&admin)))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["pagination"]["total"], 2);

        // 只给日期的 to 包含当天 16:00 的课时
        let resp = service
            .list_lessons(
                range(Some("2025-10-05"), Some("2025-10-10")),
                &request_as(&storage, Some(&admin)),
            )
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["pagination"]["total"], 2);

        let resp = service
            .list_lessons(range(None, Some("2025-10-05")), &request_as(&storage, Some(&admin)))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["items"][0]["date_time"], "2025-10-05T16:00:00Z");
        assert_eq!(body["data"]["pagination"]["total"], 1);

        let resp = service
            .list_lessons(params(Some("next week")), &request_as(&storage, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }
}
