use super::entities::LessonDetail;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct LessonListResponse {
    pub items: Vec<LessonDetail>,
    pub pagination: PaginationInfo,
}
