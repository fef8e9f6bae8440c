use std::collections::HashMap;

use super::{SeaOrmStorage, db_err};
use crate::entity::attendance::{
    ActiveModel as AttendanceActiveModel, Column as AttendanceColumn, Entity as Attendance,
};
use crate::entity::group_students::{Column as GroupStudentColumn, Entity as GroupStudents};
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons, Model};
use crate::entity::study_groups::{Column as GroupColumn, Entity as StudyGroups};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    groups::entities::dedup_ids,
    lessons::{
        entities::{
            AttendanceEntry, AttendanceRecord, DEFAULT_DURATION, DEFAULT_FORMAT, Lesson,
            LessonDetail, apply_attendance_updates, seed_attendance,
        },
        requests::{AttendanceUpdate, CreateLessonRequest, LessonListQuery, UpdateLessonRequest},
        responses::LessonListResponse,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 读取课时的考勤记录，按创建顺序
async fn load_attendance<C: ConnectionTrait>(
    conn: &C,
    lesson_ids: &[i64],
) -> Result<HashMap<i64, Vec<AttendanceRecord>>> {
    let mut map: HashMap<i64, Vec<AttendanceRecord>> = HashMap::new();
    if lesson_ids.is_empty() {
        return Ok(map);
    }

    let rows = Attendance::find()
        .filter(AttendanceColumn::LessonId.is_in(lesson_ids.iter().copied()))
        .order_by_asc(AttendanceColumn::Id)
        .all(conn)
        .await
        .map_err(db_err("Failed to query attendance"))?;

    for row in rows {
        map.entry(row.lesson_id).or_default().push(row.into_record());
    }
    Ok(map)
}

impl SeaOrmStorage {
    async fn build_lesson_details(&self, models: Vec<Model>) -> Result<Vec<LessonDetail>> {
        let lesson_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut attendance = load_attendance(&self.db, &lesson_ids).await?;

        let group_ids: Vec<i64> = models.iter().map(|m| m.group_id).collect();
        let groups = self.load_group_summaries(&dedup_ids(&group_ids)).await?;

        let student_ids: Vec<i64> = attendance
            .values()
            .flatten()
            .map(|r| r.student_id)
            .collect();
        let students = self.load_user_models(&dedup_ids(&student_ids)).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let entries = attendance
                    .remove(&m.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|r| AttendanceEntry {
                        student_id: r.student_id,
                        student_name: students.get(&r.student_id).map(|u| u.name.clone()),
                        status: r.status,
                        notes: r.notes,
                        updated_at: r.updated_at,
                    })
                    .collect();

                LessonDetail {
                    id: m.id,
                    group_id: m.group_id,
                    date_time: crate::entity::from_timestamp(m.date_time),
                    topic: m.topic,
                    duration: m.duration,
                    format: m.format,
                    is_cancelled: m.is_cancelled,
                    group: groups.get(&m.group_id).cloned(),
                    attendance: entries,
                    created_at: crate::entity::from_timestamp(m.created_at),
                    updated_at: crate::entity::from_timestamp(m.updated_at),
                }
            })
            .collect())
    }

    /// 创建课时，并在同一事务中按当前名单生成考勤
    pub async fn create_lesson_impl(
        &self,
        req: CreateLessonRequest,
        date_time: DateTime<Utc>,
    ) -> Result<Lesson> {
        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let model = ActiveModel {
            group_id: Set(req.group_id),
            date_time: Set(date_time.timestamp()),
            topic: Set(non_empty(req.topic)),
            duration: Set(non_empty(req.duration).unwrap_or_else(|| DEFAULT_DURATION.to_string())),
            format: Set(non_empty(req.format).unwrap_or_else(|| DEFAULT_FORMAT.to_string())),
            is_cancelled: Set(false),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to create lesson"))?;

        let roster: Vec<i64> = GroupStudents::find()
            .select_only()
            .column(GroupStudentColumn::StudentId)
            .filter(GroupStudentColumn::GroupId.eq(req.group_id))
            .order_by_asc(GroupStudentColumn::Id)
            .into_tuple::<i64>()
            .all(&txn)
            .await
            .map_err(db_err("Failed to query group roster"))?;

        let records = seed_attendance(&roster, now);
        let rows: Vec<AttendanceActiveModel> = records
            .iter()
            .map(|r| AttendanceActiveModel {
                lesson_id: Set(model.id),
                student_id: Set(r.student_id),
                status: Set(r.status.as_str().to_string()),
                notes: Set(None),
                updated_at: Set(r.updated_at.timestamp()),
                ..Default::default()
            })
            .collect();

        if !rows.is_empty() {
            Attendance::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(db_err("Failed to seed attendance"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit lesson"))?;

        Ok(model.into_lesson(records))
    }

    pub async fn get_lesson_by_id_impl(&self, id: i64) -> Result<Option<Lesson>> {
        let Some(model) = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query lesson"))?
        else {
            return Ok(None);
        };

        let mut attendance = load_attendance(&self.db, &[id]).await?;
        Ok(Some(model.into_lesson(attendance.remove(&id).unwrap_or_default())))
    }

    pub async fn get_lesson_detail_impl(&self, id: i64) -> Result<Option<LessonDetail>> {
        let Some(model) = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query lesson"))?
        else {
            return Ok(None);
        };

        Ok(self.build_lesson_details(vec![model]).await?.pop())
    }

    pub async fn list_lessons_with_pagination_impl(
        &self,
        query: LessonListQuery,
    ) -> Result<LessonListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Lessons::find();

        if let Some(group_ids) = query.group_ids {
            select = select.filter(Column::GroupId.is_in(group_ids));
        }
        if let Some(group_id) = query.group_id {
            select = select.filter(Column::GroupId.eq(group_id));
        }
        if let Some(from) = query.from {
            select = select.filter(Column::DateTime.gte(from.timestamp()));
        }
        if let Some(to) = query.to {
            select = select.filter(Column::DateTime.lte(to.timestamp()));
        }
        if !query.include_cancelled {
            select = select.filter(Column::IsCancelled.eq(false));
        }

        let paginator = select
            .order_by_asc(Column::DateTime)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count lessons"))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("Failed to list lessons"))?;

        Ok(LessonListResponse {
            items: self.build_lesson_details(models).await?,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_lesson_impl(
        &self,
        id: i64,
        date_time: Option<DateTime<Utc>>,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        let existing = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query lesson"))?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(date_time) = date_time {
            model.date_time = Set(date_time.timestamp());
        }
        if let Some(topic) = update.topic {
            model.topic = Set(non_empty(Some(topic)));
        }
        if let Some(duration) = non_empty(update.duration) {
            model.duration = Set(duration);
        }
        if let Some(format) = non_empty(update.format) {
            model.format = Set(format);
        }
        if let Some(is_cancelled) = update.is_cancelled {
            model.is_cancelled = Set(is_cancelled);
        }

        model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to update lesson"))?;

        self.get_lesson_by_id_impl(id).await
    }

    /// 在事务中应用考勤更新，只写回被修改的记录
    pub async fn update_attendance_impl(
        &self,
        lesson_id: i64,
        updates: Vec<AttendanceUpdate>,
    ) -> Result<Option<Lesson>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let Some(lesson) = Lessons::find_by_id(lesson_id)
            .one(&txn)
            .await
            .map_err(db_err("Failed to query lesson"))?
        else {
            return Ok(None);
        };

        let mut records = load_attendance(&txn, &[lesson_id])
            .await?
            .remove(&lesson_id)
            .unwrap_or_default();

        let now = Utc::now();
        let touched = apply_attendance_updates(&mut records, &updates, now);

        for record in records.iter().filter(|r| touched.contains(&r.student_id)) {
            Attendance::update_many()
                .col_expr(
                    AttendanceColumn::Status,
                    sea_orm::sea_query::Expr::value(record.status.as_str()),
                )
                .col_expr(
                    AttendanceColumn::Notes,
                    sea_orm::sea_query::Expr::value(record.notes.clone()),
                )
                .col_expr(
                    AttendanceColumn::UpdatedAt,
                    sea_orm::sea_query::Expr::value(record.updated_at.timestamp()),
                )
                .filter(AttendanceColumn::LessonId.eq(lesson_id))
                .filter(AttendanceColumn::StudentId.eq(record.student_id))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to update attendance"))?;
        }

        if !touched.is_empty() {
            Lessons::update_many()
                .col_expr(
                    Column::UpdatedAt,
                    sea_orm::sea_query::Expr::value(now.timestamp()),
                )
                .filter(Column::Id.eq(lesson_id))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to touch lesson"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit attendance"))?;

        let mut lesson = lesson.into_lesson(records);
        if !touched.is_empty() {
            lesson.updated_at = crate::entity::from_timestamp(now.timestamp());
        }
        Ok(Some(lesson))
    }

    pub async fn delete_lesson_impl(&self, id: i64) -> Result<bool> {
        let result = Lessons::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete lesson"))?;

        Ok(result.rows_affected > 0)
    }

    /// 学生所在的、属于该课程的所有小组的课时
    pub async fn list_student_course_lessons_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Lesson>> {
        let student_groups = self.list_group_ids_by_student_impl(student_id).await?;
        if student_groups.is_empty() {
            return Ok(Vec::new());
        }

        let group_ids: Vec<i64> = StudyGroups::find()
            .select_only()
            .column(GroupColumn::Id)
            .filter(GroupColumn::CourseId.eq(course_id))
            .filter(GroupColumn::Id.is_in(student_groups))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query course groups"))?;
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = Lessons::find()
            .filter(Column::GroupId.is_in(group_ids))
            .order_by_asc(Column::DateTime)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query lessons"))?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut attendance = load_attendance(&self.db, &ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let records = attendance.remove(&m.id).unwrap_or_default();
                m.into_lesson(records)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lessons::entities::AttendanceStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{
        seed_course, seed_group, seed_lesson, seed_user,
    };
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_lesson_seeds_attendance_from_roster() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Vira", UserRole::Teacher).await;
        let s1 = seed_user(&storage, "Marko", UserRole::Student).await;
        let s2 = seed_user(&storage, "Daryna", UserRole::Student).await;
        let course = seed_course(&storage, "Piano", 400.0, vec![teacher.id]).await;
        let group = seed_group(&storage, "Piano kids", course.id, teacher.id, vec![s1.id, s2.id]).await;

        let lesson = seed_lesson(&storage, group.id, at(1, 15)).await;
        assert_eq!(lesson.duration, "1h");
        assert_eq!(lesson.format, "online");
        assert!(!lesson.is_cancelled);
        assert_eq!(lesson.attendance.len(), 2);
        assert!(lesson.attendance.iter().all(|r| r.status == AttendanceStatus::Absent));

        // 名单变化不影响已有课时
        storage
            .update_group_impl(
                group.id,
                crate::models::groups::requests::UpdateGroupRequest {
                    student_ids: Some(vec![s1.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let reloaded = storage.get_lesson_by_id_impl(lesson.id).await.unwrap().unwrap();
        assert_eq!(reloaded.attendance.len(), 2);

        let detail = storage.get_lesson_detail_impl(lesson.id).await.unwrap().unwrap();
        assert_eq!(detail.group.unwrap().name, "Piano kids");
        assert_eq!(detail.attendance[0].student_name.as_deref(), Some("Marko"));
    }

    #[tokio::test]
    async fn test_empty_roster_yields_no_attendance() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Lesia", UserRole::Teacher).await;
        let course = seed_course(&storage, "Drawing", 100.0, vec![]).await;
        let group = seed_group(&storage, "Empty", course.id, teacher.id, vec![]).await;

        let lesson = seed_lesson(&storage, group.id, at(2, 10)).await;
        assert!(lesson.attendance.is_empty());
    }

    #[tokio::test]
    async fn test_update_attendance() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Iryna", UserRole::Teacher).await;
        let s1 = seed_user(&storage, "Kyrylo", UserRole::Student).await;
        let s2 = seed_user(&storage, "Zlata", UserRole::Student).await;
        let course = seed_course(&storage, "Chess", 150.0, vec![]).await;
        let group = seed_group(&storage, "Chess", course.id, teacher.id, vec![s1.id, s2.id]).await;
        let lesson = seed_lesson(&storage, group.id, at(3, 12)).await;

        let updated = storage
            .update_attendance_impl(
                lesson.id,
                vec![
                    AttendanceUpdate {
                        student_id: s1.id,
                        status: Some(AttendanceStatus::Present),
                        notes: Some("good work".to_string()),
                    },
                    AttendanceUpdate {
                        student_id: 9999,
                        status: Some(AttendanceStatus::Late),
                        notes: None,
                    },
                ],
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.attendance.len(), 2);
        assert_eq!(updated.attendance[0].status, AttendanceStatus::Present);
        assert_eq!(updated.attendance[0].notes.as_deref(), Some("good work"));
        assert_eq!(updated.attendance[1].status, AttendanceStatus::Absent);

        // 空字符串清空备注
        storage
            .update_attendance_impl(
                lesson.id,
                vec![AttendanceUpdate {
                    student_id: s1.id,
                    status: None,
                    notes: Some(String::new()),
                }],
            )
            .await
            .unwrap();
        let reloaded = storage.get_lesson_by_id_impl(lesson.id).await.unwrap().unwrap();
        assert_eq!(reloaded.attendance[0].notes, None);
        assert_eq!(reloaded.attendance[0].status, AttendanceStatus::Present);

        assert!(
            storage
                .update_attendance_impl(424242, vec![])
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_filters_and_ordering() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Bohdana", UserRole::Teacher).await;
        let course = seed_course(&storage, "Guitar", 200.0, vec![]).await;
        let g1 = seed_group(&storage, "A", course.id, teacher.id, vec![]).await;
        let g2 = seed_group(&storage, "B", course.id, teacher.id, vec![]).await;

        let late = seed_lesson(&storage, g1.id, at(10, 9)).await;
        let early = seed_lesson(&storage, g1.id, at(5, 9)).await;
        let other = seed_lesson(&storage, g2.id, at(7, 9)).await;
        storage
            .update_lesson_impl(
                other.id,
                None,
                UpdateLessonRequest {
                    is_cancelled: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = storage
            .list_lessons_with_pagination_impl(LessonListQuery::default())
            .await
            .unwrap();
        let ids: Vec<i64> = all.items.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![early.id, other.id, late.id]);

        let active = storage
            .list_lessons_with_pagination_impl(LessonListQuery {
                include_cancelled: false,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.pagination.total, 2);

        let scoped = storage
            .list_lessons_with_pagination_impl(LessonListQuery {
                group_ids: Some(vec![g1.id]),
                from: Some(at(6, 0)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(scoped.items.len(), 1);
        assert_eq!(scoped.items[0].id, late.id);

        let nothing = storage
            .list_lessons_with_pagination_impl(LessonListQuery {
                group_ids: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(nothing.items.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_lesson() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Oleh", UserRole::Teacher).await;
        let course = seed_course(&storage, "Biology", 220.0, vec![]).await;
        let group = seed_group(&storage, "Bio", course.id, teacher.id, vec![]).await;
        let lesson = seed_lesson(&storage, group.id, at(4, 9)).await;

        let updated = storage
            .update_lesson_impl(
                lesson.id,
                Some(at(4, 11)),
                UpdateLessonRequest {
                    topic: Some("Cells".to_string()),
                    duration: Some("1.5h".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.date_time, at(4, 11));
        assert_eq!(updated.topic.as_deref(), Some("Cells"));
        assert_eq!(updated.duration, "1.5h");
        assert_eq!(updated.format, "online");

        assert!(storage.delete_lesson_impl(lesson.id).await.unwrap());
        assert!(storage.get_lesson_by_id_impl(lesson.id).await.unwrap().is_none());
    }
}
