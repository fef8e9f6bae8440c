use chrono::{DateTime, Utc};

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

use crate::errors::Result;

pub mod sea_orm_storage;

pub use sea_orm_storage::SeaOrmStorage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段已是哈希值）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息（password 字段已是哈希值）
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;

    /// 课程管理方法
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn get_course_by_title(&self, title: &str) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    // teacher_ids 提供时整体替换
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;

    /// 小组管理方法
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group>;
    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>>;
    // 填充课程、教师、学生信息
    async fn get_group_detail(&self, id: i64) -> Result<Option<GroupDetail>>;
    async fn list_groups_with_pagination(&self, query: GroupListQuery) -> Result<GroupListResponse>;
    // student_ids 提供时替换整个名单
    async fn update_group(&self, id: i64, update: UpdateGroupRequest) -> Result<Option<Group>>;
    async fn delete_group(&self, id: i64) -> Result<bool>;
    async fn list_group_ids_by_teacher(&self, teacher_id: i64) -> Result<Vec<i64>>;
    async fn list_group_ids_by_student(&self, student_id: i64) -> Result<Vec<i64>>;
    // 学生所在小组对应的课程（去重）
    async fn list_student_courses(&self, student_id: i64) -> Result<Vec<CourseSummary>>;

    /// 课时与考勤管理方法
    // 在同一事务中按当前名单生成考勤记录
    async fn create_lesson(
        &self,
        lesson: CreateLessonRequest,
        date_time: DateTime<Utc>,
    ) -> Result<Lesson>;
    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>>;
    async fn get_lesson_detail(&self, id: i64) -> Result<Option<LessonDetail>>;
    async fn list_lessons_with_pagination(
        &self,
        query: LessonListQuery,
    ) -> Result<LessonListResponse>;
    async fn update_lesson(
        &self,
        id: i64,
        date_time: Option<DateTime<Utc>>,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>>;
    async fn update_attendance(
        &self,
        lesson_id: i64,
        updates: Vec<AttendanceUpdate>,
    ) -> Result<Option<Lesson>>;
    async fn delete_lesson(&self, id: i64) -> Result<bool>;
    // 学生在某课程所有小组中的课时
    async fn list_student_course_lessons(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Lesson>>;

    /// 教学材料管理方法
    async fn create_material(
        &self,
        material: CreateMaterialRequest,
        teacher_id: i64,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Material>;
    async fn get_material_by_id(&self, id: i64) -> Result<Option<Material>>;
    // 按创建时间倒序
    async fn list_materials_by_lesson(&self, lesson_id: i64) -> Result<Vec<Material>>;
    async fn delete_material(&self, id: i64) -> Result<bool>;
    async fn count_materials_by_teacher(&self, teacher_id: i64) -> Result<u64>;

    /// 作业提交管理方法
    // 同一学生重复提交返回 Conflict
    async fn create_submission(
        &self,
        material_id: i64,
        student_id: i64,
        submission_url: Option<String>,
    ) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn list_submissions_by_material(&self, material_id: i64)
    -> Result<Vec<SubmissionDetail>>;
    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>>;
    async fn grade_submission(
        &self,
        id: i64,
        grade: f64,
        feedback: Option<String>,
    ) -> Result<Option<Submission>>;

    /// 缴费管理方法
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment>;
    async fn get_payment_detail(&self, id: i64) -> Result<Option<PaymentDetail>>;
    async fn list_payments_with_pagination(
        &self,
        query: PaymentListQuery,
    ) -> Result<PaymentListResponse>;
    async fn list_student_course_payments(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Payment>>;
}

/// 按配置创建存储后端
pub async fn create_storage() -> Result<std::sync::Arc<dyn Storage>> {
    let storage = SeaOrmStorage::new_async().await?;
    Ok(std::sync::Arc::new(storage))
}
