//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod courses;
mod groups;
mod lessons;
mod materials;
mod payments;
mod submissions;
mod users;

#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::errors::{Result, TutorCenterError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// 将 DbErr 转换为带上下文的错误，唯一约束冲突转换为 Conflict
pub(crate) fn db_err(context: &'static str) -> impl Fn(DbErr) -> TutorCenterError {
    move |e| match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => {
            TutorCenterError::conflict(format!("{context}: {msg}"))
        }
        _ => TutorCenterError::database_operation(format!("{context}: {e}")),
    }
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout_secs: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout_secs).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout_secs).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| TutorCenterError::database_operation(format!("Migration failed: {e}")))?;

        info!("SeaORM storage initialized, database: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（文件库启用 WAL + pragma 优化）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| TutorCenterError::database_config(format!("Invalid SQLite URL: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let mut pool_options = SqlitePoolOptions::new()
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(timeout_secs));

        if in_memory {
            // 每个连接都是独立的内存库，只能保留一个且不能回收
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
            pool_options = pool_options
                .max_connections(pool_size.max(1))
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300));
        }

        let pool = pool_options.connect_with(opt).await.map_err(|e| {
            TutorCenterError::database_connection(format!("SQLite connection failed: {e}"))
        })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size.max(1))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout_secs))
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            TutorCenterError::database_connection(format!("Cannot connect to database: {e}"))
        })
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        let url = url.trim();
        if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(TutorCenterError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite:, postgres://, mysql://, or a .db/.sqlite file path"
            )))
        }
    }

    /// 内存数据库，供测试使用
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        Self::connect("sqlite::memory:", 1, 5)
            .await
            .expect("in-memory storage")
    }
}

// Storage trait 实现
use crate::models::{
    courses::{
        entities::{Course, CourseSummary},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
    groups::{
        entities::{Group, GroupDetail},
        requests::{CreateGroupRequest, GroupListQuery, UpdateGroupRequest},
        responses::GroupListResponse,
    },
    lessons::{
        entities::{Lesson, LessonDetail},
        requests::{AttendanceUpdate, CreateLessonRequest, LessonListQuery, UpdateLessonRequest},
        responses::LessonListResponse,
    },
    materials::{entities::Material, requests::CreateMaterialRequest},
    payments::{
        entities::{Payment, PaymentDetail},
        requests::{NewPayment, PaymentListQuery},
        responses::PaymentListResponse,
    },
    submissions::entities::{Submission, SubmissionDetail},
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 课程模块
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_by_title(&self, title: &str) -> Result<Option<Course>> {
        self.get_course_by_title_impl(title).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    // 小组模块
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(group).await
    }

    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        self.get_group_by_id_impl(id).await
    }

    async fn get_group_detail(&self, id: i64) -> Result<Option<GroupDetail>> {
        self.get_group_detail_impl(id).await
    }

    async fn list_groups_with_pagination(&self, query: GroupListQuery) -> Result<GroupListResponse> {
        self.list_groups_with_pagination_impl(query).await
    }

    async fn update_group(&self, id: i64, update: UpdateGroupRequest) -> Result<Option<Group>> {
        self.update_group_impl(id, update).await
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        self.delete_group_impl(id).await
    }

    async fn list_group_ids_by_teacher(&self, teacher_id: i64) -> Result<Vec<i64>> {
        self.list_group_ids_by_teacher_impl(teacher_id).await
    }

    async fn list_group_ids_by_student(&self, student_id: i64) -> Result<Vec<i64>> {
        self.list_group_ids_by_student_impl(student_id).await
    }

    async fn list_student_courses(&self, student_id: i64) -> Result<Vec<CourseSummary>> {
        self.list_student_courses_impl(student_id).await
    }

    // 课时模块
    async fn create_lesson(
        &self,
        lesson: CreateLessonRequest,
        date_time: DateTime<Utc>,
    ) -> Result<Lesson> {
        self.create_lesson_impl(lesson, date_time).await
    }

    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_by_id_impl(id).await
    }

    async fn get_lesson_detail(&self, id: i64) -> Result<Option<LessonDetail>> {
        self.get_lesson_detail_impl(id).await
    }

    async fn list_lessons_with_pagination(
        &self,
        query: LessonListQuery,
    ) -> Result<LessonListResponse> {
        self.list_lessons_with_pagination_impl(query).await
    }

    async fn update_lesson(
        &self,
        id: i64,
        date_time: Option<DateTime<Utc>>,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        self.update_lesson_impl(id, date_time, update).await
    }

    async fn update_attendance(
        &self,
        lesson_id: i64,
        updates: Vec<AttendanceUpdate>,
    ) -> Result<Option<Lesson>> {
        self.update_attendance_impl(lesson_id, updates).await
    }

    async fn delete_lesson(&self, id: i64) -> Result<bool> {
        self.delete_lesson_impl(id).await
    }

    async fn list_student_course_lessons(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Lesson>> {
        self.list_student_course_lessons_impl(student_id, course_id)
            .await
    }

    // 材料模块
    async fn create_material(
        &self,
        material: CreateMaterialRequest,
        teacher_id: i64,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Material> {
        self.create_material_impl(material, teacher_id, due_date)
            .await
    }

    async fn get_material_by_id(&self, id: i64) -> Result<Option<Material>> {
        self.get_material_by_id_impl(id).await
    }

    async fn list_materials_by_lesson(&self, lesson_id: i64) -> Result<Vec<Material>> {
        self.list_materials_by_lesson_impl(lesson_id).await
    }

    async fn delete_material(&self, id: i64) -> Result<bool> {
        self.delete_material_impl(id).await
    }

    async fn count_materials_by_teacher(&self, teacher_id: i64) -> Result<u64> {
        self.count_materials_by_teacher_impl(teacher_id).await
    }

    // 提交模块
    async fn create_submission(
        &self,
        material_id: i64,
        student_id: i64,
        submission_url: Option<String>,
    ) -> Result<Submission> {
        self.create_submission_impl(material_id, student_id, submission_url)
            .await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn list_submissions_by_material(
        &self,
        material_id: i64,
    ) -> Result<Vec<SubmissionDetail>> {
        self.list_submissions_by_material_impl(material_id).await
    }

    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_by_student_impl(student_id).await
    }

    async fn grade_submission(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade, feedback).await
    }

    // 缴费模块
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        self.create_payment_impl(payment).await
    }

    async fn get_payment_detail(&self, id: i64) -> Result<Option<PaymentDetail>> {
        self.get_payment_detail_impl(id).await
    }

    async fn list_payments_with_pagination(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse> {
        self.list_payments_with_pagination_impl(query).await
    }

    async fn list_student_course_payments(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Payment>> {
        self.list_student_course_payments_impl(student_id, course_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("tutorcenter.db").unwrap(),
            "sqlite://tutorcenter.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/tc").unwrap(),
            "postgres://u:p@localhost/tc"
        );
        assert!(SeaOrmStorage::build_database_url("mongodb://localhost").is_err());
    }
}
