use super::{SeaOrmStorage, db_err};
use crate::entity::materials::{ActiveModel, Column, Entity as Materials};
use crate::errors::Result;
use crate::models::materials::{entities::Material, requests::CreateMaterialRequest};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_material_impl(
        &self,
        req: CreateMaterialRequest,
        teacher_id: i64,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Material> {
        let now = Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title.trim().to_string()),
            lesson_id: Set(req.lesson_id),
            teacher_id: Set(teacher_id),
            material_type: Set(req.material_type.as_str().to_string()),
            content: Set(req.content),
            due_date: Set(due_date.map(|d| d.timestamp())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_err("Failed to create material"))?;

        Ok(result.into_material())
    }

    pub async fn get_material_by_id_impl(&self, id: i64) -> Result<Option<Material>> {
        let result = Materials::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("Failed to query material"))?;

        Ok(result.map(|m| m.into_material()))
    }

    pub async fn list_materials_by_lesson_impl(&self, lesson_id: i64) -> Result<Vec<Material>> {
        let materials = Materials::find()
            .filter(Column::LessonId.eq(lesson_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("Failed to list materials"))?;

        Ok(materials.into_iter().map(|m| m.into_material()).collect())
    }

    pub async fn delete_material_impl(&self, id: i64) -> Result<bool> {
        let result = Materials::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("Failed to delete material"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_materials_by_teacher_impl(&self, teacher_id: i64) -> Result<u64> {
        Materials::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .count(&self.db)
            .await
            .map_err(db_err("Failed to count teacher materials"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::materials::entities::MaterialType;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{
        seed_course, seed_group, seed_lesson, seed_user,
    };

    #[tokio::test]
    async fn test_materials_of_lesson_newest_first() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Ostap", UserRole::Teacher).await;
        let course = seed_course(&storage, "Spanish", 260.0, vec![]).await;
        let group = seed_group(&storage, "ES-1", course.id, teacher.id, vec![]).await;
        let lesson = seed_lesson(&storage, group.id, Utc::now()).await;

        let notes = storage
            .create_material_impl(
                CreateMaterialRequest {
                    title: "Verb table".to_string(),
                    lesson_id: lesson.id,
                    material_type: MaterialType::Document,
                    content: Some("https://example.com/verbs.pdf".to_string()),
                    due_date: None,
                },
                teacher.id,
                None,
            )
            .await
            .unwrap();
        let assignment = storage
            .create_material_impl(
                CreateMaterialRequest {
                    title: "Essay".to_string(),
                    lesson_id: lesson.id,
                    material_type: MaterialType::Assignment,
                    content: None,
                    due_date: None,
                },
                teacher.id,
                Some(Utc::now()),
            )
            .await
            .unwrap();
        assert!(assignment.is_assignment());
        assert!(assignment.due_date.is_some());

        let listed = storage.list_materials_by_lesson_impl(lesson.id).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![assignment.id, notes.id]);

        assert!(storage.delete_material_impl(notes.id).await.unwrap());
        assert!(storage.get_material_by_id_impl(notes.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lesson_delete_cascades_to_materials() {
        let storage = SeaOrmStorage::in_memory().await;
        let teacher = seed_user(&storage, "Mykola", UserRole::Teacher).await;
        let course = seed_course(&storage, "Art", 120.0, vec![]).await;
        let group = seed_group(&storage, "Art-1", course.id, teacher.id, vec![]).await;
        let lesson = seed_lesson(&storage, group.id, Utc::now()).await;

        let material = storage
            .create_material_impl(
                CreateMaterialRequest {
                    title: "Palette".to_string(),
                    lesson_id: lesson.id,
                    material_type: MaterialType::Text,
                    content: Some("Mix warm colours".to_string()),
                    due_date: None,
                },
                teacher.id,
                None,
            )
            .await
            .unwrap();

        storage.delete_lesson_impl(lesson.id).await.unwrap();
        assert!(storage.get_material_by_id_impl(material.id).await.unwrap().is_none());
    }
}
