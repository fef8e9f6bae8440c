use super::entities::GroupFormat;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::query::optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::query::optional_i64")]
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::query::optional_i64")]
    pub student_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateGroupRequest {
    pub name: String,
    pub course_id: i64,
    pub teacher_id: i64,
    #[serde(default)]
    pub student_ids: Vec<i64>,
    pub format: Option<GroupFormat>,
}

// 提供的字段整体替换，student_ids 替换整个名单
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub course_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub student_ids: Option<Vec<i64>>,
    pub format: Option<GroupFormat>,
    pub is_active: Option<bool>,
}

// 存储层查询参数，角色范围由服务层转换为 teacher_id / student_id
#[derive(Debug, Clone, Default)]
pub struct GroupListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub course_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub student_id: Option<i64>,
}
