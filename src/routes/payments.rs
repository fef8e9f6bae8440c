use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::payments::requests::{
    BalanceParams, CreatePaymentRequest, PaymentListParams, StudentCoursesParams,
};
use crate::models::users::entities::UserRole;
use crate::services::PaymentService;

static PAYMENT_SERVICE: Lazy<PaymentService> = Lazy::new(PaymentService::new_lazy);

pub async fn list_payments(
    req: HttpRequest,
    query: web::Query<PaymentListParams>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.list_payments(query.into_inner(), &req).await
}

pub async fn create_payment(
    req: HttpRequest,
    payment_data: web::Json<CreatePaymentRequest>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE
        .create_payment(payment_data.into_inner(), &req)
        .await
}

pub async fn list_student_courses(
    req: HttpRequest,
    query: web::Query<StudentCoursesParams>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE
        .list_student_courses(query.into_inner(), &req)
        .await
}

pub async fn get_balance(
    req: HttpRequest,
    query: web::Query<BalanceParams>,
) -> ActixResult<HttpResponse> {
    PAYMENT_SERVICE.get_balance(query.into_inner(), &req).await
}

// 配置路由，整个模块仅管理员可用
pub fn configure_payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/payments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new(&UserRole::Admin))
                    .route("", web::get().to(list_payments))
                    .route("", web::post().to(create_payment))
                    .route("/courses", web::get().to(list_student_courses))
                    .route("/balance", web::get().to(get_balance)),
            ),
    );
}
