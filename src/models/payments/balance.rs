//! 余额计算
//!
//! 对已经取出的课时和缴费列表做减法，不在数据库中聚合。

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::entities::Payment;
use crate::models::lessons::entities::Lesson;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/payment.ts")]
pub struct BalanceResponse {
    pub student_id: i64,
    pub course_id: i64,
    pub price_per_lesson: f64,
    /// 已上（未取消且时间不晚于现在）的课时数
    pub lessons_count: i64,
    pub total_cost: f64,
    pub total_paid: f64,
    /// 负数表示欠费
    pub balance: f64,
}

/// 计入费用的课时：时间不晚于 `now` 且未取消
pub fn billable_lessons(lessons: &[Lesson], now: DateTime<Utc>) -> usize {
    lessons
        .iter()
        .filter(|l| !l.is_cancelled && l.date_time <= now)
        .count()
}

pub fn compute_balance(
    student_id: i64,
    course_id: i64,
    price_per_lesson: f64,
    lessons: &[Lesson],
    payments: &[Payment],
    now: DateTime<Utc>,
) -> BalanceResponse {
    let lessons_count = billable_lessons(lessons, now);
    let total_cost = price_per_lesson * lessons_count as f64;
    // 空迭代器上 f64 的 sum 得到 -0.0
    let total_paid = payments
        .iter()
        .filter(|p| p.student_id == Some(student_id) && p.course_id == Some(course_id))
        .fold(0.0, |acc, p| acc + p.amount_paid);

    BalanceResponse {
        student_id,
        course_id,
        price_per_lesson,
        lessons_count: lessons_count as i64,
        total_cost,
        total_paid,
        balance: total_paid - total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn lesson(offset_days: i64, cancelled: bool) -> Lesson {
        let at = now() + Duration::days(offset_days);
        Lesson {
            id: offset_days,
            group_id: 1,
            date_time: at,
            topic: None,
            duration: "1h".to_string(),
            format: "online".to_string(),
            is_cancelled: cancelled,
            attendance: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }

    fn payment(student_id: Option<i64>, course_id: Option<i64>, amount: f64) -> Payment {
        Payment {
            id: 1,
            student_id,
            course_id,
            amount_paid: amount,
            payment_method: "Transfer".to_string(),
            payment_date: now(),
            is_confirmed: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_only_past_uncancelled_lessons_are_billed() {
        let lessons = vec![
            lesson(-3, false),
            lesson(-2, true),
            lesson(-1, false),
            lesson(0, false),
            lesson(2, false),
        ];
        assert_eq!(billable_lessons(&lessons, now()), 3);
    }

    #[test]
    fn test_cancelled_past_lesson_is_free() {
        let balance = compute_balance(5, 9, 100.0, &[lesson(-1, true)], &[], now());
        assert_eq!(balance.lessons_count, 0);
        assert_eq!(balance.total_cost, 0.0);
    }

    #[test]
    fn test_balance_debt_and_credit() {
        let lessons = vec![lesson(-7, false), lesson(-1, false)];

        let debt = compute_balance(5, 9, 300.0, &lessons, &[payment(Some(5), Some(9), 200.0)], now());
        assert_eq!(debt.total_cost, 600.0);
        assert_eq!(debt.total_paid, 200.0);
        assert_eq!(debt.balance, -400.0);
        assert_eq!(debt.lessons_count, 2);

        let credit = compute_balance(
            5,
            9,
            300.0,
            &lessons,
            &[payment(Some(5), Some(9), 500.0), payment(Some(5), Some(9), 250.0)],
            now(),
        );
        assert_eq!(credit.balance, 150.0);
    }

    #[test]
    fn test_foreign_payments_ignored() {
        let payments = vec![
            payment(Some(6), Some(9), 1000.0),
            payment(Some(5), Some(8), 1000.0),
            payment(None, Some(9), 1000.0),
        ];
        let balance = compute_balance(5, 9, 100.0, &[], &payments, now());
        assert_eq!(balance.total_paid, 0.0);
        assert!(balance.total_paid.is_sign_positive());
        assert!(balance.balance.is_sign_positive());

        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["total_paid"].to_string(), "0.0");
        assert_eq!(json["balance"].to_string(), "0.0");
    }
}
