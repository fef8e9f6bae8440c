use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::UserSummary;

pub const DEFAULT_PAYMENT_METHOD: &str = "Transfer";

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct Payment {
    pub id: i64,
    /// 学生被删除后为 null
    pub student_id: Option<i64>,
    /// 课程被删除后为 null
    pub course_id: Option<i64>,
    pub amount_paid: f64,
    pub payment_method: String,
    pub payment_date: chrono::DateTime<chrono::Utc>,
    pub is_confirmed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentCourse {
    pub id: i64,
    pub title: String,
}

/// 填充了学生和课程信息的缴费记录
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub payment: Payment,
    pub student: Option<UserSummary>,
    pub course: Option<PaymentCourse>,
}
