use std::collections::HashMap;

use super::{SeaOrmStorage, db_err};
use crate::entity::course_teachers::{
    ActiveModel as CourseTeacherActiveModel, Column as CourseTeacherColumn,
    Entity as CourseTeachers,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses, Model};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    courses::{
        entities::Course,
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
    groups::entities::dedup_ids,
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// 在给定连接（可为事务）上整体替换课程的教师列表
async fn replace_course_teachers<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
    teacher_ids: &[i64],
) -> Result<()> {
    CourseTeachers::delete_many()
        .filter(CourseTeacherColumn::CourseId.eq(course_id))
        .exec(conn)
        .await
        .map_err(db_err("Failed to clear course teachers"))?;

    let rows: Vec<CourseTeacherActiveModel> = dedup_ids(teacher_ids)
        .into_iter()
        .map(|teacher_id| CourseTeacherActiveModel {
            course_id: Set(course_id),
            teacher_id: Set(teacher_id),
            ..Default::default()
        })
        .collect();

    if !rows.is_empty() {
        CourseTeachers::insert_many(rows)
            .exec(conn)
            .await
            .map_err(db_err("Failed to assign course teachers"))?;
    }
    Ok(())
}

impl SeaOrmStorage {
    /// 批量读取课程的教师 ID
    async fn load_teacher_ids(&self, course_ids: &[i64]) -> Result<HashMap<i64, Vec<i64>>> {
        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        if course_ids.is_empty() {
            return Ok(map);
        }

        let rows = CourseTeachers::find()
            .filter(CourseTeacherColumn::CourseId.is_in(course_ids.iter().copied()))
            .order_by_asc(CourseTeacherColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query course teachers"))?;

        for row in rows {
            map.entry(row.course_id).or_default().push(row.teacher_id);
        }
        Ok(map)
    }

    async fn to_course(&self, model: Model) -> Result<Course> {
        let mut teachers = self.load_teacher_ids(&[model.id]).await?;
        let teacher_ids = teachers.remove(&model.id).unwrap_or_default();
        Ok(model.into_course(teacher_ids))
    }

    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let model = ActiveModel {
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            price_per_hour: Set(req.price_per_hour.unwrap_or(0.0)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to create course"))?;

        replace_course_teachers(&txn, model.id, &req.teacher_ids).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit course"))?;

        Ok(model.into_course(dedup_ids(&req.teacher_ids)))
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let model = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query course"))?;

        match model {
            Some(m) => Ok(Some(self.to_course(m).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_course_by_title_impl(&self, title: &str) -> Result<Option<Course>> {
        let model = Courses::find()
            .filter(Column::Title.eq(title.trim()))
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query course"))?;

        match model {
            Some(m) => Ok(Some(self.to_course(m).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Courses::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Title.like(contains_pattern(search)));
        }

        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }

        let paginator = select
            .order_by_asc(Column::Title)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count courses"))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("Failed to list courses"))?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut teachers = self.load_teacher_ids(&ids).await?;

        let items = models
            .into_iter()
            .map(|m| {
                let teacher_ids = teachers.remove(&m.id).unwrap_or_default();
                m.into_course(teacher_ids)
            })
            .collect();

        Ok(CourseListResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let existing = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query course"))?;
        if existing.is_none() {
            return Ok(None);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(price) = update.price_per_hour {
            model.price_per_hour = Set(price);
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&txn)
            .await
            .map_err(db_err("Failed to update course"))?;

        if let Some(ref teacher_ids) = update.teacher_ids {
            replace_course_teachers(&txn, id, teacher_ids).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit course update"))?;

        self.get_course_by_id_impl(id).await
    }

    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete course"))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{seed_course, seed_user};

    #[tokio::test]
    async fn test_create_course_with_teachers() {
        let storage = SeaOrmStorage::in_memory().await;
        let t1 = seed_user(&storage, "Maria", UserRole::Teacher).await;
        let t2 = seed_user(&storage, "Petro", UserRole::Teacher).await;

        let course = seed_course(&storage, "English B1", 350.0, vec![t1.id, t2.id, t1.id]).await;
        assert_eq!(course.teacher_ids, vec![t1.id, t2.id]);
        assert!(course.is_active);

        let loaded = storage.get_course_by_id_impl(course.id).await.unwrap().unwrap();
        assert_eq!(loaded.teacher_ids, vec![t1.id, t2.id]);
        assert_eq!(loaded.price_per_hour, 350.0);

        let by_title = storage
            .get_course_by_title_impl("English B1")
            .await
            .unwrap();
        assert_eq!(by_title.map(|c| c.id), Some(course.id));
    }

    #[tokio::test]
    async fn test_duplicate_title_is_conflict() {
        let storage = SeaOrmStorage::in_memory().await;
        seed_course(&storage, "Math", 200.0, vec![]).await;

        let err = storage
            .create_course_impl(CreateCourseRequest {
                title: "Math".to_string(),
                description: None,
                price_per_hour: None,
                teacher_ids: vec![],
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_replaces_teachers() {
        let storage = SeaOrmStorage::in_memory().await;
        let t1 = seed_user(&storage, "Olha", UserRole::Teacher).await;
        let t2 = seed_user(&storage, "Ihor", UserRole::Teacher).await;
        let course = seed_course(&storage, "Physics", 300.0, vec![t1.id]).await;

        let updated = storage
            .update_course_impl(
                course.id,
                UpdateCourseRequest {
                    teacher_ids: Some(vec![t2.id]),
                    price_per_hour: Some(320.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.teacher_ids, vec![t2.id]);
        assert_eq!(updated.price_per_hour, 320.0);
        assert_eq!(updated.title, "Physics");

        // 未提供 teacher_ids 时保持原列表
        let kept = storage
            .update_course_impl(
                course.id,
                UpdateCourseRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.teacher_ids, vec![t2.id]);
        assert!(!kept.is_active);

        assert!(
            storage
                .update_course_impl(999, UpdateCourseRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_search_and_delete() {
        let storage = SeaOrmStorage::in_memory().await;
        seed_course(&storage, "English A2", 250.0, vec![]).await;
        seed_course(&storage, "English B1", 300.0, vec![]).await;
        let chem = seed_course(&storage, "Chemistry", 280.0, vec![]).await;

        let english = storage
            .list_courses_with_pagination_impl(CourseListQuery {
                search: Some("english".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(english.pagination.total, 2);

        assert!(storage.delete_course_impl(chem.id).await.unwrap());
        let all = storage
            .list_courses_with_pagination_impl(CourseListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.items.len(), 2);
        assert_eq!(all.items[0].title, "English A2");
    }
}
