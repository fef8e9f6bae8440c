use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{Result, TutorCenterError};
use crate::models::groups::entities::GroupSummary;

use super::requests::AttendanceUpdate;

pub const DEFAULT_DURATION: &str = "1h";
pub const DEFAULT_FORMAT: &str = "online";

// 考勤状态
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct AttendanceRecord {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct Lesson {
    pub id: i64,
    pub group_id: i64,
    pub date_time: DateTime<Utc>,
    pub topic: Option<String>,
    pub duration: String,
    pub format: String,
    pub is_cancelled: bool,
    pub attendance: Vec<AttendanceRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 带学生姓名的考勤记录
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub student_name: Option<String>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// 填充了小组摘要和学生姓名的课时
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct LessonDetail {
    pub id: i64,
    pub group_id: i64,
    pub date_time: DateTime<Utc>,
    pub topic: Option<String>,
    pub duration: String,
    pub format: String,
    pub is_cancelled: bool,
    pub group: Option<GroupSummary>,
    pub attendance: Vec<AttendanceEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 按当前名单生成考勤记录，全部默认为缺席
pub fn seed_attendance(student_ids: &[i64], now: DateTime<Utc>) -> Vec<AttendanceRecord> {
    student_ids
        .iter()
        .map(|&student_id| AttendanceRecord {
            student_id,
            status: AttendanceStatus::Absent,
            notes: None,
            updated_at: now,
        })
        .collect()
}

/// 将考勤更新应用到已有记录上，返回被修改的学生 ID
///
/// 没有对应记录的学生会被忽略；notes 为空字符串时清空备注。
pub fn apply_attendance_updates(
    records: &mut [AttendanceRecord],
    updates: &[AttendanceUpdate],
    now: DateTime<Utc>,
) -> Vec<i64> {
    let mut touched = Vec::new();
    for update in updates {
        let Some(record) = records
            .iter_mut()
            .find(|r| r.student_id == update.student_id)
        else {
            continue;
        };

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(notes) = &update.notes {
            record.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
        record.updated_at = now;

        if !touched.contains(&update.student_id) {
            touched.push(update.student_id);
        }
    }
    touched
}

/// 解析日期时间：RFC 3339，或不带时区的 `YYYY-MM-DDTHH:MM[:SS]`（按 UTC 处理）
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    // 只有日期时取当天零点
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// 解析区间上界：只有日期时包含当天全部课时（当天 23:59:59）
pub fn parse_range_end(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
            - Duration::seconds(1)),
        Err(_) => parse_datetime(value),
    }
}

/// 确定课时时间：`date_time` 优先，否则组合 `date` + `time`
pub fn resolve_lesson_datetime(
    date_time: Option<&str>,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<DateTime<Utc>> {
    if let Some(dt) = date_time.filter(|s| !s.trim().is_empty()) {
        return parse_datetime(dt);
    }

    match (
        date.map(str::trim).filter(|s| !s.is_empty()),
        time.map(str::trim).filter(|s| !s.is_empty()),
    ) {
        (Some(date), Some(time)) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
            let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))?;
            Ok(date.and_time(time).and_utc())
        }
        _ => Err(TutorCenterError::validation(
            "Either date_time or both date and time are required",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    fn update(student_id: i64, status: Option<AttendanceStatus>, notes: Option<&str>) -> AttendanceUpdate {
        AttendanceUpdate {
            student_id,
            status,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_seed_attendance_defaults_to_absent() {
        let records = seed_attendance(&[4, 9], ts(9, 0));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == AttendanceStatus::Absent));
        assert!(records.iter().all(|r| r.notes.is_none()));
        assert_eq!(records[1].student_id, 9);

        assert!(seed_attendance(&[], ts(9, 0)).is_empty());
    }

    #[test]
    fn test_apply_updates_status_and_notes() {
        let mut records = seed_attendance(&[1, 2, 3], ts(9, 0));
        let touched = apply_attendance_updates(
            &mut records,
            &[
                update(1, Some(AttendanceStatus::Present), None),
                update(2, None, Some("came after the break")),
            ],
            ts(10, 0),
        );

        assert_eq!(touched, vec![1, 2]);
        assert_eq!(records[0].status, AttendanceStatus::Present);
        assert_eq!(records[0].notes, None);
        assert_eq!(records[1].status, AttendanceStatus::Absent);
        assert_eq!(records[1].notes.as_deref(), Some("came after the break"));
        assert_eq!(records[1].updated_at, ts(10, 0));
        assert_eq!(records[2].updated_at, ts(9, 0));
    }

    #[test]
    fn test_apply_updates_ignores_unknown_students_and_clears_notes() {
        let mut records = seed_attendance(&[1], ts(9, 0));
        records[0].notes = Some("sick".to_string());

        let touched = apply_attendance_updates(
            &mut records,
            &[
                update(42, Some(AttendanceStatus::Late), None),
                update(1, Some(AttendanceStatus::Late), Some("")),
            ],
            ts(11, 0),
        );

        assert_eq!(touched, vec![1]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Late);
        assert_eq!(records[0].notes, None);
    }

    #[test]
    fn test_resolve_datetime_prefers_date_time() {
        let dt = resolve_lesson_datetime(Some("2025-03-14T08:30:00+02:00"), Some("2020-01-01"), Some("00:00"))
            .unwrap();
        assert_eq!(dt, ts(6, 30));
    }

    #[test]
    fn test_resolve_datetime_from_date_and_time() {
        assert_eq!(
            resolve_lesson_datetime(None, Some("2025-03-14"), Some("17:45")).unwrap(),
            ts(17, 45)
        );
        assert_eq!(
            resolve_lesson_datetime(Some("  "), Some("2025-03-14"), Some("17:45:00")).unwrap(),
            ts(17, 45)
        );
    }

    #[test]
    fn test_resolve_datetime_requires_input() {
        let err = resolve_lesson_datetime(None, Some("2025-03-14"), None).unwrap_err();
        assert_eq!(err.code(), "E007");
        let err = resolve_lesson_datetime(None, Some("14.03.2025"), Some("10:00")).unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[test]
    fn test_parse_datetime_variants() {
        assert_eq!(parse_datetime("2025-03-14T17:45").unwrap(), ts(17, 45));
        assert_eq!(parse_datetime("2025-03-14T17:45:00Z").unwrap(), ts(17, 45));
        assert_eq!(parse_datetime("2025-03-14").unwrap(), ts(0, 0));
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_range_end_covers_whole_day() {
        assert_eq!(
            parse_range_end("2025-03-14").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 59).unwrap()
        );
        assert_eq!(parse_range_end("2025-03-14T17:45").unwrap(), ts(17, 45));
        assert!(parse_range_end("tomorrow").is_err());
    }
}
