//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离；所有对外类型都会通过 ts-rs 导出给前端。

pub mod auth;
pub mod common;
pub mod courses;
pub mod groups;
pub mod health;
pub mod lessons;
pub mod materials;
pub mod payments;
pub mod submissions;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间，用于计算运行时长
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// API 业务错误码
///
/// 0 表示成功；1xxx 通用，2xxx 认证，3xxx 用户，4xxx 课程，
/// 5xxx 小组，6xxx 课时与考勤，7xxx 材料与作业，8xxx 缴费。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserAccountInactive = 2002,
    RefreshTokenInvalid = 2003,

    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserEmailInvalid = 3002,
    UserPasswordInvalid = 3003,
    UserNameInvalid = 3004,
    UserCreationFailed = 3005,
    UserUpdateFailed = 3006,
    UserDeleteFailed = 3007,
    CanNotDeleteCurrentUser = 3008,
    UserStillTeaching = 3009,

    CourseNotFound = 4000,
    CourseAlreadyExists = 4001,
    CourseTitleInvalid = 4002,
    CoursePriceInvalid = 4003,
    CourseTeacherInvalid = 4004,

    GroupNotFound = 5000,
    GroupNameInvalid = 5001,
    GroupTeacherInvalid = 5002,
    GroupStudentInvalid = 5003,
    GroupPermissionDenied = 5004,

    LessonNotFound = 6000,
    LessonDateTimeInvalid = 6001,
    LessonPermissionDenied = 6002,

    MaterialNotFound = 7000,
    MaterialTitleInvalid = 7001,
    MaterialPermissionDenied = 7002,
    AssignmentNotFound = 7003,
    SubmissionNotFound = 7004,
    SubmissionAlreadyExists = 7005,
    SubmissionGradeInvalid = 7006,
    SubmissionPermissionDenied = 7007,

    PaymentInvalid = 8000,
    PaymentStudentInvalid = 8001,
    PaymentCourseInvalid = 8002,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::RateLimitExceeded as i32, 1029);
        assert_eq!(ErrorCode::SubmissionAlreadyExists as i32, 7005);
        assert_eq!(ErrorCode::PaymentInvalid as i32, 8000);
    }
}
