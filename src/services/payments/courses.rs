use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PaymentService, load_student};
use crate::models::{
    ApiResponse,
    payments::{requests::StudentCoursesParams, responses::StudentCoursesResponse},
};
use crate::services::internal_error;

pub async fn list_student_courses(
    service: &PaymentService,
    query: StudentCoursesParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = load_student(&storage, query.student_id).await {
        return Ok(response);
    }

    match storage.list_student_courses(query.student_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentCoursesResponse { items },
            "Student courses retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve student courses", e)),
    }
}
