use serde::Deserialize;
use ts_rs::TS;

use super::entities::AttendanceStatus;
use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct LessonListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::query::optional_i64")]
    pub group_id: Option<i64>,
    /// 起始时间（含）
    pub from: Option<String>,
    /// 结束时间（含）
    pub to: Option<String>,
    /// 默认包含已取消的课时
    #[serde(default, deserialize_with = "crate::models::common::query::optional_bool")]
    pub include_cancelled: Option<bool>,
}

/// `date_time` 优先；否则需要同时提供 `date`（YYYY-MM-DD）和 `time`（HH:MM）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct CreateLessonRequest {
    pub group_id: i64,
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub topic: Option<String>,
    pub duration: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct UpdateLessonRequest {
    pub date_time: Option<String>,
    pub topic: Option<String>,
    pub duration: Option<String>,
    pub format: Option<String>,
    pub is_cancelled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct AttendanceUpdate {
    pub student_id: i64,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct UpdateAttendanceRequest {
    pub attendance_updates: Vec<AttendanceUpdate>,
}

// 存储层查询参数
#[derive(Debug, Clone)]
pub struct LessonListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub group_id: Option<i64>,
    /// 限定在这些小组内（教师/学生的角色范围）
    pub group_ids: Option<Vec<i64>>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub include_cancelled: bool,
}

impl Default for LessonListQuery {
    fn default() -> Self {
        Self {
            page: None,
            size: None,
            group_id: None,
            group_ids: None,
            from: None,
            to: None,
            include_cancelled: true,
        }
    }
}
