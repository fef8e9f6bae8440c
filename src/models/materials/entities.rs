use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 材料类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/material.ts")]
pub enum MaterialType {
    Document,
    Link,
    Text,
    Assignment,
}

impl MaterialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Document => "document",
            MaterialType::Link => "link",
            MaterialType::Text => "text",
            MaterialType::Assignment => "assignment",
        }
    }
}

impl std::str::FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(MaterialType::Document),
            "link" => Ok(MaterialType::Link),
            "text" => Ok(MaterialType::Text),
            "assignment" => Ok(MaterialType::Assignment),
            _ => Err(format!("Invalid material type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/material.ts")]
pub struct Material {
    pub id: i64,
    pub title: String,
    pub lesson_id: i64,
    /// 所属小组的教师
    pub teacher_id: i64,
    pub material_type: MaterialType,
    pub content: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Material {
    pub fn is_assignment(&self) -> bool {
        self.material_type == MaterialType::Assignment
    }
}
