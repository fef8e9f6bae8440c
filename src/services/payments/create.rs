use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{PaymentService, load_student};
use crate::models::{
    ApiResponse, ErrorCode,
    lessons::entities::parse_datetime,
    payments::{
        entities::DEFAULT_PAYMENT_METHOD,
        requests::{CreatePaymentRequest, NewPayment},
    },
};
use crate::services::{bad_request, internal_error, not_found};

/// 校验必填字段并补全默认值
fn validate_payment(payment_data: CreatePaymentRequest) -> Result<NewPayment, HttpResponse> {
    let Some(student_id) = payment_data.student_id else {
        return Err(bad_request(ErrorCode::PaymentStudentInvalid, "student_id is required"));
    };
    let Some(course_id) = payment_data.course_id else {
        return Err(bad_request(ErrorCode::PaymentCourseInvalid, "course_id is required"));
    };
    let amount_paid = match payment_data.amount_paid {
        Some(amount) if amount.is_finite() && amount > 0.0 => amount,
        Some(_) => {
            return Err(bad_request(
                ErrorCode::PaymentInvalid,
                "amount_paid must be a positive number",
            ));
        }
        None => return Err(bad_request(ErrorCode::PaymentInvalid, "amount_paid is required")),
    };

    let payment_date = match payment_data.payment_date.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => parse_datetime(value)
            .map_err(|e| bad_request(ErrorCode::PaymentInvalid, e.message()))?,
        _ => chrono::Utc::now(),
    };

    let payment_method = payment_data
        .payment_method
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

    Ok(NewPayment {
        student_id,
        course_id,
        amount_paid,
        payment_method,
        payment_date,
        is_confirmed: payment_data.is_confirmed.unwrap_or(false),
    })
}

pub async fn create_payment(
    service: &PaymentService,
    payment_data: CreatePaymentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let payment = match validate_payment(payment_data) {
        Ok(payment) => payment,
        Err(response) => return Ok(response),
    };

    let storage = service.get_storage(request)?;
    if let Err(response) = load_student(&storage, payment.student_id).await {
        return Ok(response);
    }
    match storage.get_course_by_id(payment.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(internal_error("Failed to load course", e)),
    }

    let payment = match storage.create_payment(payment).await {
        Ok(payment) => payment,
        Err(e) => return Ok(internal_error("Failed to create payment", e)),
    };
    info!(
        "Payment {} of {:.2} recorded for student {:?}",
        payment.id, payment.amount_paid, payment.student_id
    );

    match storage.get_payment_detail(payment.id).await {
        Ok(Some(detail)) => Ok(HttpResponse::Created().json(ApiResponse::success(
            detail,
            "Payment created successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::NotFound, "Payment not found")),
        Err(e) => Ok(internal_error("Failed to load created payment", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, new_storage, request_as, seed_course, seed_user};

    fn payment(student_id: Option<i64>, course_id: Option<i64>, amount: Option<f64>) -> CreatePaymentRequest {
        CreatePaymentRequest {
            student_id,
            course_id,
            amount_paid: amount,
            payment_method: None,
            payment_date: None,
            is_confirmed: None,
        }
    }

    #[test]
    fn test_validate_payment_defaults() {
        let new_payment = validate_payment(payment(Some(1), Some(2), Some(150.0))).unwrap();
        assert_eq!(new_payment.payment_method, DEFAULT_PAYMENT_METHOD);
        assert!(!new_payment.is_confirmed);

        let mut dated = payment(Some(1), Some(2), Some(150.0));
        dated.payment_date = Some("2025-02-01".to_string());
        dated.payment_method = Some("  Cash ".to_string());
        let new_payment = validate_payment(dated).unwrap();
        assert_eq!(new_payment.payment_method, "Cash");
        assert_eq!(new_payment.payment_date.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_validate_payment_rejects_missing_or_non_positive() {
        for request in [
            payment(None, Some(2), Some(10.0)),
            payment(Some(1), None, Some(10.0)),
            payment(Some(1), Some(2), None),
            payment(Some(1), Some(2), Some(0.0)),
            payment(Some(1), Some(2), Some(-20.0)),
        ] {
            let response = validate_payment(request).unwrap_err();
            assert_eq!(response.status(), 400);
        }
    }

    #[actix_web::test]
    async fn test_create_payment_requires_student_role() {
        let storage = new_storage().await;
        let student = seed_user(&storage, "student@example.com", UserRole::Student).await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let course = seed_course(&storage, "Piano", 600.0).await;
        let req = request_as(&storage, None);
        let service = PaymentService::new_lazy();

        let resp = service
            .create_payment(payment(Some(teacher.id), Some(course.id), Some(600.0)), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let resp = service
            .create_payment(payment(Some(student.id), Some(course.id + 9), Some(600.0)), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = service
            .create_payment(payment(Some(student.id), Some(course.id), Some(600.0)), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["student"]["email"], "student@example.com");
        assert_eq!(body["data"]["course"]["title"], "Piano");
        assert_eq!(body["data"]["payment_method"], DEFAULT_PAYMENT_METHOD);
    }
}
