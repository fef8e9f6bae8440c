use super::{SeaOrmStorage, db_err};
use crate::entity::courses::Model as CourseModel;
use crate::entity::payments::{ActiveModel, Column, Entity as Payments, Model};
use crate::entity::users::Model as UserModel;
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    groups::entities::dedup_ids,
    payments::{
        entities::{Payment, PaymentCourse, PaymentDetail},
        requests::{NewPayment, PaymentListQuery},
        responses::PaymentListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 填充学生和课程信息，被删除的引用为 None
    async fn build_payment_details(&self, models: Vec<Model>) -> Result<Vec<PaymentDetail>> {
        let student_ids: Vec<i64> = models.iter().filter_map(|m| m.student_id).collect();
        let students = self.load_user_models(&dedup_ids(&student_ids)).await?;
        let course_ids: Vec<i64> = models.iter().filter_map(|m| m.course_id).collect();
        let courses = self.load_course_models(&dedup_ids(&course_ids)).await?;

        Ok(models
            .into_iter()
            .map(|m| PaymentDetail {
                student: m
                    .student_id
                    .and_then(|id| students.get(&id).cloned())
                    .map(UserModel::into_summary),
                course: m
                    .course_id
                    .and_then(|id| courses.get(&id))
                    .map(|c: &CourseModel| PaymentCourse {
                        id: c.id,
                        title: c.title.clone(),
                    }),
                payment: m.into_payment(),
            })
            .collect())
    }

    pub async fn create_payment_impl(&self, payment: NewPayment) -> Result<Payment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(Some(payment.student_id)),
            course_id: Set(Some(payment.course_id)),
            amount_paid: Set(payment.amount_paid),
            payment_method: Set(payment.payment_method),
            payment_date: Set(payment.payment_date.timestamp()),
            is_confirmed: Set(payment.is_confirmed),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("Failed to create payment"))?;

        Ok(result.into_payment())
    }

    pub async fn get_payment_detail_impl(&self, id: i64) -> Result<Option<PaymentDetail>> {
        let Some(model) = Payments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query payment"))?
        else {
            return Ok(None);
        };

        Ok(self.build_payment_details(vec![model]).await?.pop())
    }

    pub async fn list_payments_with_pagination_impl(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Payments::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        let paginator = select
            .order_by_desc(Column::PaymentDate)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count payments"))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("Failed to list payments"))?;

        Ok(PaymentListResponse {
            items: self.build_payment_details(models).await?,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn list_student_course_payments_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Payment>> {
        let payments = Payments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::PaymentDate)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query payments"))?;

        Ok(payments.into_iter().map(|p| p.into_payment()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payments::balance::compute_balance;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{
        seed_course, seed_group, seed_lesson, seed_user,
    };
    use chrono::{Duration, Utc};

    fn payment(student_id: i64, course_id: i64, amount: f64, days_ago: i64) -> NewPayment {
        NewPayment {
            student_id,
            course_id,
            amount_paid: amount,
            payment_method: "Cash".to_string(),
            payment_date: Utc::now() - Duration::days(days_ago),
            is_confirmed: true,
        }
    }

    #[tokio::test]
    async fn test_list_payments_newest_first_with_details() {
        let storage = SeaOrmStorage::in_memory().await;
        let student = seed_user(&storage, "Taisia", UserRole::Student).await;
        let course = seed_course(&storage, "French", 300.0, vec![]).await;

        let older = storage
            .create_payment_impl(payment(student.id, course.id, 600.0, 10))
            .await
            .unwrap();
        let newer = storage
            .create_payment_impl(payment(student.id, course.id, 300.0, 1))
            .await
            .unwrap();

        let listed = storage
            .list_payments_with_pagination_impl(PaymentListQuery {
                student_id: Some(student.id),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = listed.items.iter().map(|p| p.payment.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(listed.items[0].student.as_ref().map(|s| s.id), Some(student.id));
        assert_eq!(
            listed.items[0].course,
            Some(PaymentCourse {
                id: course.id,
                title: "French".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_deleted_references_become_null() {
        let storage = SeaOrmStorage::in_memory().await;
        let student = seed_user(&storage, "Myroslava", UserRole::Student).await;
        let course = seed_course(&storage, "Polish", 250.0, vec![]).await;
        let created = storage
            .create_payment_impl(payment(student.id, course.id, 500.0, 0))
            .await
            .unwrap();

        storage.delete_course_impl(course.id).await.unwrap();
        storage.delete_user_impl(student.id).await.unwrap();

        let detail = storage
            .get_payment_detail_impl(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.payment.student_id, None);
        assert_eq!(detail.payment.course_id, None);
        assert!(detail.student.is_none());
        assert!(detail.course.is_none());
        assert_eq!(detail.payment.amount_paid, 500.0);
    }

    #[tokio::test]
    async fn test_balance_from_fetched_lists() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Svitlana", UserRole::Teacher).await;
        let student = seed_user(&storage, "Artem", UserRole::Student).await;
        let course = seed_course(&storage, "Math", 200.0, vec![]).await;
        let other = seed_course(&storage, "Physics", 500.0, vec![]).await;
        let g1 = seed_group(&storage, "M1", course.id, teacher.id, vec![student.id]).await;
        let g2 = seed_group(&storage, "M2", course.id, teacher.id, vec![student.id]).await;
        let g3 = seed_group(&storage, "P1", other.id, teacher.id, vec![student.id]).await;

        let now = Utc::now();
        seed_lesson(&storage, g1.id, now - Duration::days(3)).await;
        seed_lesson(&storage, g2.id, now - Duration::days(2)).await;
        seed_lesson(&storage, g1.id, now + Duration::days(2)).await;
        seed_lesson(&storage, g3.id, now - Duration::days(1)).await;

        storage
            .create_payment_impl(payment(student.id, course.id, 150.0, 1))
            .await
            .unwrap();
        storage
            .create_payment_impl(payment(student.id, other.id, 999.0, 1))
            .await
            .unwrap();

        let lessons = storage
            .list_student_course_lessons_impl(student.id, course.id)
            .await
            .unwrap();
        assert_eq!(lessons.len(), 3);
        let payments = storage
            .list_student_course_payments_impl(student.id, course.id)
            .await
            .unwrap();

        let balance = compute_balance(
            student.id,
            course.id,
            course.price_per_hour,
            &lessons,
            &payments,
            now,
        );
        assert_eq!(balance.lessons_count, 2);
        assert_eq!(balance.total_cost, 400.0);
        assert_eq!(balance.total_paid, 150.0);
        assert_eq!(balance.balance, -250.0);
    }
}
