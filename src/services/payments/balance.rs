use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::{PaymentService, load_student};
use crate::models::{
    ApiResponse, ErrorCode,
    payments::{balance::compute_balance, requests::BalanceParams},
};
use crate::services::{internal_error, not_found};

/// 余额 = 已缴金额 - 已上课时费用，负数表示欠费
pub async fn get_balance(
    service: &PaymentService,
    query: BalanceParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Err(response) = load_student(&storage, query.student_id).await {
        return Ok(response);
    }

    let course = match storage.get_course_by_id(query.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(internal_error("Failed to load course", e)),
    };

    let lessons = match storage
        .list_student_course_lessons(query.student_id, query.course_id)
        .await
    {
        Ok(lessons) => lessons,
        Err(e) => return Ok(internal_error("Failed to load lessons", e)),
    };
    let payments = match storage
        .list_student_course_payments(query.student_id, query.course_id)
        .await
    {
        Ok(payments) => payments,
        Err(e) => return Ok(internal_error("Failed to load payments", e)),
    };

    let balance = compute_balance(
        query.student_id,
        query.course_id,
        course.price_per_hour,
        &lessons,
        &payments,
        chrono::Utc::now(),
    );
    debug!(
        "Balance for student {} in course {}: {:.2}",
        balance.student_id, balance.course_id, balance.balance
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        balance,
        "Balance calculated successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payments::requests::NewPayment;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{
        body_json, new_storage, request_as, seed_course, seed_group, seed_lesson, seed_user,
    };
    use chrono::{Duration, Utc};

    #[actix_web::test]
    async fn test_balance_counts_past_lessons_across_groups() {
        let storage = new_storage().await;
        let teacher = seed_user(&storage, "teacher@example.com", UserRole::Teacher).await;
        let student = seed_user(&storage, "student@example.com", UserRole::Student).await;
        let course = seed_course(&storage, "Guitar", 200.0).await;
        let other_course = seed_course(&storage, "Drums", 900.0).await;
        let morning = seed_group(&storage, course.id, teacher.id, vec![student.id]).await;
        let evening = seed_group(&storage, course.id, teacher.id, vec![student.id]).await;
        let drums = seed_group(&storage, other_course.id, teacher.id, vec![student.id]).await;

        let now = Utc::now();
        seed_lesson(&storage, morning.id, now - Duration::days(3)).await;
        seed_lesson(&storage, evening.id, now - Duration::days(1)).await;
        seed_lesson(&storage, morning.id, now + Duration::days(2)).await;
        seed_lesson(&storage, drums.id, now - Duration::days(2)).await;

        storage
            .create_payment(NewPayment {
                student_id: student.id,
                course_id: course.id,
                amount_paid: 150.0,
                payment_method: "Cash".to_string(),
                payment_date: now,
                is_confirmed: true,
            })
            .await
            .unwrap();

        let resp = PaymentService::new_lazy()
            .get_balance(
                BalanceParams {
                    student_id: student.id,
                    course_id: course.id,
                },
                &request_as(&storage, None),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["lessons_count"], 2);
        assert_eq!(body["data"]["total_cost"], 400.0);
        assert_eq!(body["data"]["total_paid"], 150.0);
        assert_eq!(body["data"]["balance"], -250.0);
    }
}
