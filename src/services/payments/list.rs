use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PaymentService;
use crate::models::{
    ApiResponse,
    payments::requests::{PaymentListParams, PaymentListQuery},
};
use crate::services::internal_error;

pub async fn list_payments(
    service: &PaymentService,
    query: PaymentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let (page, size) = query.pagination.normalized();

    let list_query = PaymentListQuery {
        page: Some(page),
        size: Some(size),
        student_id: query.student_id,
        course_id: query.course_id,
    };

    match storage.list_payments_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Payment list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve payment list", e)),
    }
}
