use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::{
    ApiResponse,
    groups::requests::{GroupListParams, GroupListQuery},
    users::entities::UserRole,
};
use crate::services::{current_user, internal_error};

pub async fn list_groups(
    service: &GroupService,
    query: GroupListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let (page, size) = query.pagination.normalized();

    let mut list_query = GroupListQuery {
        page: Some(page),
        size: Some(size),
        course_id: query.course_id,
        teacher_id: query.teacher_id,
        student_id: query.student_id,
    };

    // 按角色收窄查询范围
    match user.role {
        UserRole::Admin => {}
        UserRole::Teacher => {
            list_query.teacher_id = Some(user.id);
            list_query.student_id = None;
        }
        UserRole::Student => {
            list_query.student_id = Some(user.id);
            list_query.teacher_id = None;
        }
    }

    match storage.list_groups_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Group list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve group list", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::PaginationQuery;
    use crate::services::test_support::{
        body_json, new_storage, request_as, seed_course, seed_group, seed_user,
    };

    fn params(teacher_id: Option<i64>) -> GroupListParams {
        GroupListParams {
            pagination: PaginationQuery { page: 1, size: 10 },
            course_id: None,
            teacher_id,
            student_id: None,
        }
    }

    #[actix_web::test]
    async fn test_groups_are_scoped_by_role() {
        let storage = new_storage().await;
        let admin = seed_user(&storage, "admin@example.com", UserRole::Admin).await;
        let olha = seed_user(&storage, "olha@example.com", UserRole::Teacher).await;
        let petro = seed_user(&storage, "petro@example.com", UserRole::Teacher).await;
        let ivan = seed_user(&storage, "ivan@example.com", UserRole::Student).await;
        let course = seed_course(&storage, "German A2", 250.0).await;

        seed_group(&storage, course.id, olha.id, vec![ivan.id]).await;
        seed_group(&storage, course.id, petro.id, Vec::new()).await;

        let service = GroupService::new_lazy();
        let total = |body: serde_json::Value| body["data"]["pagination"]["total"].as_i64();

        let resp = service
            .list_groups(params(None), &request_as(&storage, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(total(body_json(resp).await), Some(2));

        // 教师传入别人的 teacher_id 也只能看到自己的小组
        let resp = service
            .list_groups(params(Some(petro.id)), &request_as(&storage, Some(&olha)))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(total(body.clone()), Some(1));
        assert_eq!(body["data"]["items"][0]["teacher"]["id"], olha.id);
        assert_eq!(body["data"]["items"][0]["students"][0]["name"], "ivan");

        let resp = service
            .list_groups(params(None), &request_as(&storage, Some(&ivan)))
            .await
            .unwrap();
        assert_eq!(total(body_json(resp).await), Some(1));

        let resp = service
            .list_groups(params(None), &request_as(&storage, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }
}
