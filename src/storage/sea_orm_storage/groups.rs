use std::collections::HashMap;

use super::{SeaOrmStorage, db_err};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses, Model as CourseModel};
use crate::entity::group_students::{
    ActiveModel as GroupStudentActiveModel, Column as GroupStudentColumn, Entity as GroupStudents,
};
use crate::entity::study_groups::{ActiveModel, Column, Entity as StudyGroups, Model};
use crate::entity::users::{Column as UserColumn, Entity as Users, Model as UserModel};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    courses::entities::CourseSummary,
    groups::{
        entities::{Group, GroupDetail, GroupFormat, GroupSummary, dedup_ids},
        requests::{CreateGroupRequest, GroupListQuery, UpdateGroupRequest},
        responses::GroupListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 整体替换小组名单
async fn replace_group_students<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
    student_ids: &[i64],
) -> Result<()> {
    GroupStudents::delete_many()
        .filter(GroupStudentColumn::GroupId.eq(group_id))
        .exec(conn)
        .await
        .map_err(db_err("Failed to clear group roster"))?;

    let now = chrono::Utc::now().timestamp();
    let rows: Vec<GroupStudentActiveModel> = dedup_ids(student_ids)
        .into_iter()
        .map(|student_id| GroupStudentActiveModel {
            group_id: Set(group_id),
            student_id: Set(student_id),
            joined_at: Set(now),
            ..Default::default()
        })
        .collect();

    if !rows.is_empty() {
        GroupStudents::insert_many(rows)
            .exec(conn)
            .await
            .map_err(db_err("Failed to assign group students"))?;
    }
    Ok(())
}

impl SeaOrmStorage {
    /// 批量读取小组名单，按加入顺序
    pub(super) async fn load_student_ids(
        &self,
        group_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>> {
        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        if group_ids.is_empty() {
            return Ok(map);
        }

        let rows = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.is_in(group_ids.iter().copied()))
            .order_by_asc(GroupStudentColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query group students"))?;

        for row in rows {
            map.entry(row.group_id).or_default().push(row.student_id);
        }
        Ok(map)
    }

    pub(super) async fn load_user_models(&self, ids: &[i64]) -> Result<HashMap<i64, UserModel>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = Users::find()
            .filter(UserColumn::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query users"))?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    pub(super) async fn load_course_models(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, CourseModel>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let courses = Courses::find()
            .filter(CourseColumn::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query courses"))?;
        Ok(courses.into_iter().map(|c| (c.id, c)).collect())
    }

    /// 填充课程、教师和学生信息
    async fn build_group_details(&self, models: Vec<Model>) -> Result<Vec<GroupDetail>> {
        let group_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let mut rosters = self.load_student_ids(&group_ids).await?;

        let mut user_ids: Vec<i64> = models.iter().map(|m| m.teacher_id).collect();
        user_ids.extend(rosters.values().flatten().copied());
        let users = self.load_user_models(&dedup_ids(&user_ids)).await?;

        let course_ids: Vec<i64> = models.iter().map(|m| m.course_id).collect();
        let courses = self.load_course_models(&dedup_ids(&course_ids)).await?;

        let details = models
            .into_iter()
            .map(|m| {
                let students = rosters
                    .remove(&m.id)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|id| users.get(id).cloned().map(UserModel::into_summary))
                    .collect();

                GroupDetail {
                    id: m.id,
                    format: m.format.parse::<GroupFormat>().unwrap_or_default(),
                    is_active: m.is_active,
                    course: courses.get(&m.course_id).map(CourseModel::summary),
                    teacher: users
                        .get(&m.teacher_id)
                        .cloned()
                        .map(UserModel::into_summary),
                    students,
                    created_at: crate::entity::from_timestamp(m.created_at),
                    updated_at: crate::entity::from_timestamp(m.updated_at),
                    name: m.name,
                }
            })
            .collect();

        Ok(details)
    }

    /// 课时列表中使用的小组摘要
    pub(super) async fn load_group_summaries(
        &self,
        group_ids: &[i64],
    ) -> Result<HashMap<i64, GroupSummary>> {
        if group_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = StudyGroups::find()
            .filter(Column::Id.is_in(group_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query groups"))?;

        let teacher_ids: Vec<i64> = models.iter().map(|m| m.teacher_id).collect();
        let teachers = self.load_user_models(&dedup_ids(&teacher_ids)).await?;
        let course_ids: Vec<i64> = models.iter().map(|m| m.course_id).collect();
        let courses = self.load_course_models(&dedup_ids(&course_ids)).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let summary = GroupSummary {
                    id: m.id,
                    format: m.format.parse::<GroupFormat>().unwrap_or_default(),
                    course: courses.get(&m.course_id).map(CourseModel::summary),
                    teacher: teachers
                        .get(&m.teacher_id)
                        .cloned()
                        .map(UserModel::into_summary),
                    name: m.name,
                };
                (summary.id, summary)
            })
            .collect())
    }

    pub async fn create_group_impl(&self, req: CreateGroupRequest) -> Result<Group> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let model = ActiveModel {
            name: Set(req.name.trim().to_string()),
            course_id: Set(req.course_id),
            teacher_id: Set(req.teacher_id),
            format: Set(req.format.unwrap_or_default().to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to create group"))?;

        replace_group_students(&txn, model.id, &req.student_ids).await?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit group"))?;

        Ok(model.into_group(dedup_ids(&req.student_ids)))
    }

    pub async fn get_group_by_id_impl(&self, id: i64) -> Result<Option<Group>> {
        let Some(model) = StudyGroups::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query group"))?
        else {
            return Ok(None);
        };

        let mut rosters = self.load_student_ids(&[id]).await?;
        Ok(Some(model.into_group(rosters.remove(&id).unwrap_or_default())))
    }

    pub async fn get_group_detail_impl(&self, id: i64) -> Result<Option<GroupDetail>> {
        let Some(model) = StudyGroups::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query group"))?
        else {
            return Ok(None);
        };

        Ok(self.build_group_details(vec![model]).await?.pop())
    }

    pub async fn list_groups_with_pagination_impl(
        &self,
        query: GroupListQuery,
    ) -> Result<GroupListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = StudyGroups::find();

        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(student_id) = query.student_id {
            let group_ids = self.list_group_ids_by_student_impl(student_id).await?;
            select = select.filter(Column::Id.is_in(group_ids));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count groups"))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("Failed to list groups"))?;

        Ok(GroupListResponse {
            items: self.build_group_details(models).await?,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_group_impl(
        &self,
        id: i64,
        update: UpdateGroupRequest,
    ) -> Result<Option<Group>> {
        let existing = StudyGroups::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query group"))?;
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
        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(course_id) = update.course_id {
            model.course_id = Set(course_id);
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(teacher_id);
        }
        if let Some(format) = update.format {
            model.format = Set(format.to_string());
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&txn)
            .await
            .map_err(db_err("Failed to update group"))?;

        // 已有课时的考勤不随名单变化
        if let Some(ref student_ids) = update.student_ids {
            replace_group_students(&txn, id, student_ids).await?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit group update"))?;

        self.get_group_by_id_impl(id).await
    }

    pub async fn delete_group_impl(&self, id: i64) -> Result<bool> {
        let result = StudyGroups::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete group"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_group_ids_by_teacher_impl(&self, teacher_id: i64) -> Result<Vec<i64>> {
        StudyGroups::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query teacher groups"))
    }

    pub async fn list_group_ids_by_student_impl(&self, student_id: i64) -> Result<Vec<i64>> {
        GroupStudents::find()
            .select_only()
            .column(GroupStudentColumn::GroupId)
            .filter(GroupStudentColumn::StudentId.eq(student_id))
            .order_by_asc(GroupStudentColumn::GroupId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query student groups"))
    }

    pub async fn list_student_courses_impl(&self, student_id: i64) -> Result<Vec<CourseSummary>> {
        let group_ids = self.list_group_ids_by_student_impl(student_id).await?;
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = StudyGroups::find()
            .select_only()
            .column(Column::CourseId)
            .filter(Column::Id.is_in(group_ids))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query student courses"))?;

        let courses = Courses::find()
            .filter(CourseColumn::Id.is_in(dedup_ids(&course_ids)))
            .order_by_asc(CourseColumn::Title)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to query courses"))?;

        Ok(courses.iter().map(CourseModel::summary).collect())
    }
}
