//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub price_per_hour: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_teachers::Entity")]
    CourseTeachers,
    #[sea_orm(has_many = "super::study_groups::Entity")]
    StudyGroups,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::course_teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseTeachers.def()
    }
}

impl Related<super::study_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudyGroups.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_course(self, teacher_ids: Vec<i64>) -> crate::models::courses::entities::Course {
        crate::models::courses::entities::Course {
            id: self.id,
            title: self.title,
            description: self.description,
            price_per_hour: self.price_per_hour,
            teacher_ids,
            is_active: self.is_active,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }

    pub fn summary(&self) -> crate::models::courses::entities::CourseSummary {
        crate::models::courses::entities::CourseSummary {
            id: self.id,
            title: self.title.clone(),
            price_per_hour: self.price_per_hour,
        }
    }
}
