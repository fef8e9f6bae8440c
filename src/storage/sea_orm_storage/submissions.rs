use super::{SeaOrmStorage, db_err};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::entity::users::Model as UserModel;
use crate::errors::Result;
use crate::models::{
    groups::entities::dedup_ids,
    submissions::entities::{Submission, SubmissionDetail},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 唯一索引 (material_id, student_id) 冲突时返回 Conflict
    pub async fn create_submission_impl(
        &self,
        material_id: i64,
        student_id: i64,
        submission_url: Option<String>,
    ) -> Result<Submission> {
        let model = ActiveModel {
            material_id: Set(material_id),
            student_id: Set(student_id),
            submission_url: Set(submission_url),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            grade: Set(None),
            feedback: Set(None),
            is_graded: Set(false),
            graded_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("Failed to create submission"))?;

        Ok(result.into_submission())
    }

    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query submission"))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn list_submissions_by_material_impl(
        &self,
        material_id: i64,
    ) -> Result<Vec<SubmissionDetail>> {
        let submissions = Submissions::find()
            .filter(Column::MaterialId.eq(material_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list submissions"))?;

        let student_ids: Vec<i64> = submissions.iter().map(|s| s.student_id).collect();
        let students = self.load_user_models(&dedup_ids(&student_ids)).await?;

        Ok(submissions
            .into_iter()
            .map(|s| SubmissionDetail {
                student: students
                    .get(&s.student_id)
                    .cloned()
                    .map(UserModel::into_summary),
                submission: s.into_submission(),
            })
            .collect())
    }

    pub async fn list_submissions_by_student_impl(&self, student_id: i64) -> Result<Vec<Submission>> {
        let submissions = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list submissions"))?;

        Ok(submissions.into_iter().map(|s| s.into_submission()).collect())
    }

    pub async fn grade_submission_impl(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        if self.get_submission_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            grade: Set(Some(grade)),
            feedback: Set(feedback),
            is_graded: Set(true),
            graded_at: Set(Some(chrono::Utc::now().timestamp())),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(db_err("Failed to grade submission"))?;

        Ok(Some(result.into_submission()))
    }
}
