use super::entities::MaterialType;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/material.ts")]
pub struct CreateMaterialRequest {
    pub title: String,
    pub lesson_id: i64,
    pub material_type: MaterialType,
    pub content: Option<String>,
    /// RFC 3339 或 YYYY-MM-DD
    pub due_date: Option<String>,
}
