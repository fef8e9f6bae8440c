use super::entities::PaymentDetail;
use crate::models::common::PaginationInfo;
use crate::models::courses::entities::CourseSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct PaymentListResponse {
    pub items: Vec<PaymentDetail>,
    pub pagination: PaginationInfo,
}

/// 学生所在小组对应的课程（缴费表单的可选项）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct StudentCoursesResponse {
    pub items: Vec<CourseSummary>,
}
