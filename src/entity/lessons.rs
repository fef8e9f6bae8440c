//! 课时实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub group_id: i64,
    pub date_time: i64,
    pub topic: Option<String>,
    pub duration: String,
    pub format: String,
    pub is_cancelled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::study_groups::Entity",
        from = "Column::GroupId",
        to = "super::study_groups::Column::Id"
    )]
    Group,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    #[sea_orm(has_many = "super::materials::Entity")]
    Materials,
}

impl Related<super::study_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl Related<super::materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_lesson(
        self,
        attendance: Vec<crate::models::lessons::entities::AttendanceRecord>,
    ) -> crate::models::lessons::entities::Lesson {
        crate::models::lessons::entities::Lesson {
            id: self.id,
            group_id: self.group_id,
            date_time: super::from_timestamp(self.date_time),
            topic: self.topic,
            duration: self.duration,
            format: self.format,
            is_cancelled: self.is_cancelled,
            attendance,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
