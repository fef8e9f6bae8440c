use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::query::optional_i64")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::query::optional_i64")]
    pub course_id: Option<i64>,
}

// 缺少的必填字段由服务层返回 400
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct CreatePaymentRequest {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub amount_paid: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_date: Option<String>,
    pub is_confirmed: Option<bool>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct StudentCoursesParams {
    pub student_id: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct BalanceParams {
    pub student_id: i64,
    pub course_id: i64,
}

// 存储层查询参数
#[derive(Debug, Clone, Default)]
pub struct PaymentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
}

// 校验通过后的缴费记录
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub student_id: i64,
    pub course_id: i64,
    pub amount_paid: f64,
    pub payment_method: String,
    pub payment_date: chrono::DateTime<chrono::Utc>,
    pub is_confirmed: bool,
}
