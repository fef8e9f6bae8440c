use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// 每节课的价格（按课时收费，一节课计一次）
    pub price_per_hour: f64,
    pub teacher_ids: Vec<i64>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            title: self.title.clone(),
            price_per_hour: self.price_per_hour,
        }
    }
}

/// 嵌入到小组、缴费响应中的课程摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub price_per_hour: f64,
}

/// 价格必须是有限的非负数
pub fn validate_price(price: f64) -> Result<(), &'static str> {
    if !price.is_finite() {
        return Err("Price must be a finite number");
    }
    if price < 0.0 {
        return Err("Price cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(450.5).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }
}
