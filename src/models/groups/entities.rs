use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::courses::entities::CourseSummary;
use crate::models::users::entities::UserSummary;

// 授课形式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub enum GroupFormat {
    #[default]
    Online,
    Offline,
}

impl GroupFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupFormat::Online => "online",
            GroupFormat::Offline => "offline",
        }
    }
}

impl std::fmt::Display for GroupFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GroupFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(GroupFormat::Online),
            "offline" => Ok(GroupFormat::Offline),
            _ => Err(format!("Invalid group format: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
    pub teacher_id: i64,
    pub student_ids: Vec<i64>,
    pub format: GroupFormat,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Group {
    pub fn has_student(&self, student_id: i64) -> bool {
        self.student_ids.contains(&student_id)
    }
}

/// 填充了课程、教师和学生信息的小组
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupDetail {
    pub id: i64,
    pub name: String,
    pub format: GroupFormat,
    pub is_active: bool,
    /// 被引用的行删除后为 null
    pub course: Option<CourseSummary>,
    pub teacher: Option<UserSummary>,
    pub students: Vec<UserSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 嵌入到课时中的小组摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
    pub format: GroupFormat,
    pub course: Option<CourseSummary>,
    pub teacher: Option<UserSummary>,
}

/// 去重并保持首次出现的顺序
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_ids_keeps_first_occurrence() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(&[]).is_empty());
    }

    #[test]
    fn test_format_serde() {
        assert_eq!(serde_json::to_string(&GroupFormat::Offline).unwrap(), "\"offline\"");
        assert_eq!("online".parse::<GroupFormat>().unwrap(), GroupFormat::Online);
        assert!("hybrid".parse::<GroupFormat>().is_err());
    }
}
