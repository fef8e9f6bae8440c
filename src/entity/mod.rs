//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! 时间统一以 UNIX 秒存储。

pub mod prelude;

pub mod attendance;
pub mod course_teachers;
pub mod courses;
pub mod group_students;
pub mod lessons;
pub mod materials;
pub mod payments;
pub mod study_groups;
pub mod submissions;
pub mod users;

use chrono::{DateTime, Utc};

pub(crate) fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
