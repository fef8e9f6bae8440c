use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    /// 作业（类型为 assignment 的材料）
    pub material_id: i64,
    pub student_id: i64,
    pub submission_url: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub is_graded: bool,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 带学生信息的提交
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub student: Option<UserSummary>,
}

/// 分数必须是有限的非负数
pub fn validate_grade(grade: f64) -> Result<(), &'static str> {
    if !grade.is_finite() {
        return Err("Grade must be a finite number");
    }
    if grade < 0.0 {
        return Err("Grade cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_grade() {
        assert!(validate_grade(0.0).is_ok());
        assert!(validate_grade(11.5).is_ok());
        assert!(validate_grade(-0.5).is_err());
        assert!(validate_grade(f64::NAN).is_err());
        assert!(validate_grade(f64::NEG_INFINITY).is_err());
    }
}
