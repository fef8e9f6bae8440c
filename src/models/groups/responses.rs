use super::entities::GroupDetail;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListResponse {
    pub items: Vec<GroupDetail>,
    pub pagination: PaginationInfo,
}
