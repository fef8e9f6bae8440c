//! 存储层测试夹具

use super::SeaOrmStorage;
use crate::models::{
    courses::{entities::Course, requests::CreateCourseRequest},
    groups::{entities::Group, requests::CreateGroupRequest},
    lessons::{entities::Lesson, requests::CreateLessonRequest},
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    },
};
use chrono::{DateTime, Utc};

pub(crate) fn new_user(name: &str, email: &str, role: UserRole) -> CreateUserRequest {
    CreateUserRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "hash".to_string(),
        role,
        is_active: None,
    }
}

pub(crate) async fn seed_user(storage: &SeaOrmStorage, name: &str, role: UserRole) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    storage
        .create_user_impl(new_user(name, &email, role))
        .await
        .unwrap()
}

pub(crate) async fn seed_course(
    storage: &SeaOrmStorage,
    title: &str,
    price: f64,
    teacher_ids: Vec<i64>,
) -> Course {
    storage
        .create_course_impl(CreateCourseRequest {
            title: title.to_string(),
            description: None,
            price_per_hour: Some(price),
            teacher_ids,
        })
        .await
        .unwrap()
}

pub(crate) async fn seed_group(
    storage: &SeaOrmStorage,
    name: &str,
    course_id: i64,
    teacher_id: i64,
    student_ids: Vec<i64>,
) -> Group {
    storage
        .create_group_impl(CreateGroupRequest {
            name: name.to_string(),
            course_id,
            teacher_id,
            student_ids,
            format: None,
        })
        .await
        .unwrap()
}

pub(crate) async fn seed_lesson(
    storage: &SeaOrmStorage,
    group_id: i64,
    date_time: DateTime<Utc>,
) -> Lesson {
    storage
        .create_lesson_impl(
            CreateLessonRequest {
                group_id,
                date_time: None,
                date: None,
                time: None,
                topic: None,
                duration: None,
                format: None,
            },
            date_time,
        )
        .await
        .unwrap()
}
