//! 统一错误处理模块
//!
//! 内部错误（存储、缓存、配置、启动流程）统一使用 [`TutorCenterError`]，
//! HTTP 层错误则通过 `ApiResponse` + `ErrorCode` 返回。

use std::fmt;

/// 生成错误枚举及其代码、类型名称和构造函数
macro_rules! define_tutorcenter_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum TutorCenterError {
            $($variant(String),)*
        }

        impl TutorCenterError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(TutorCenterError::$variant(_) => $code,)*
                }
            }

            pub fn error_type(&self) -> &'static str {
                match self {
                    $(TutorCenterError::$variant(_) => $type_name,)*
                }
            }

            pub fn message(&self) -> &str {
                match self {
                    $(TutorCenterError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl TutorCenterError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        TutorCenterError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_tutorcenter_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Io("E006", "IO Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Conflict("E010", "Conflict"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
}

impl TutorCenterError {
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 唯一约束冲突（重复邮箱、重复提交等）
    pub fn is_conflict(&self) -> bool {
        matches!(self, TutorCenterError::Conflict(_))
    }
}

impl fmt::Display for TutorCenterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TutorCenterError {}

impl From<sea_orm::DbErr> for TutorCenterError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => TutorCenterError::Conflict(msg),
            _ => TutorCenterError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for TutorCenterError {
    fn from(err: std::io::Error) -> Self {
        TutorCenterError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TutorCenterError {
    fn from(err: serde_json::Error) -> Self {
        TutorCenterError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for TutorCenterError {
    fn from(err: chrono::ParseError) -> Self {
        TutorCenterError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TutorCenterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TutorCenterError::cache_connection("x").code(), "E001");
        assert_eq!(TutorCenterError::database_config("x").code(), "E003");
        assert_eq!(TutorCenterError::conflict("x").code(), "E010");
        assert_eq!(TutorCenterError::authorization("x").code(), "E013");
    }

    #[test]
    fn test_error_types_and_message() {
        let err = TutorCenterError::not_found("Lesson 7");
        assert_eq!(err.error_type(), "Resource Not Found");
        assert_eq!(err.message(), "Lesson 7");
        assert!(!err.is_conflict());
        assert!(TutorCenterError::conflict("dup").is_conflict());
    }

    #[test]
    fn test_format_simple() {
        let formatted = TutorCenterError::validation("amount must be positive").format_simple();
        assert_eq!(formatted, "Validation Error: amount must be positive");
        assert_eq!(
            TutorCenterError::validation("amount must be positive").to_string(),
            formatted
        );
    }

    #[test]
    fn test_from_chrono_parse_error() {
        let parse_err = chrono::NaiveDate::parse_from_str("2025-13-40", "%Y-%m-%d").unwrap_err();
        let err: TutorCenterError = parse_err.into();
        assert_eq!(err.code(), "E011");
    }
}
